use tessera_tiles::{FrameSize, Layer, TextureHandle, TileRegistry};

use crate::rules::Uv;

/// Pixel geometry of the atlas pages. Sprite-sheet loading lives elsewhere;
/// the engine only needs frame sizes and the gutter between frames.
pub trait AtlasLayout {
    fn frame_size(&self, layer: Layer, id: u16) -> FrameSize;
    fn padding(&self) -> u16;
}

/// Frame sizes taken from the registry's per-type `frame` settings.
#[derive(Clone, Debug)]
pub struct RegistryAtlas {
    tiles: Vec<FrameSize>,
    walls: Vec<FrameSize>,
    padding: u16,
}

impl RegistryAtlas {
    pub fn from_registry(reg: &TileRegistry) -> Self {
        Self {
            tiles: reg.tiles.iter().map(|t| t.frame).collect(),
            walls: reg.walls.iter().map(|w| w.frame).collect(),
            padding: reg.padding,
        }
    }
}

impl AtlasLayout for RegistryAtlas {
    fn frame_size(&self, layer: Layer, id: u16) -> FrameSize {
        match layer {
            Layer::Tile => self.tiles.get(id as usize).copied().unwrap_or(FrameSize::TILE),
            Layer::Wall => self.walls.get(id as usize).copied().unwrap_or(FrameSize::WALL),
        }
    }

    fn padding(&self) -> u16 {
        self.padding
    }
}

/// What to draw for one cell layer: a pixel rectangle on an atlas page.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Visual {
    pub u: u32,
    pub v: u32,
    pub width: u16,
    pub height: u16,
    pub texture: TextureHandle,
    pub paint: u8,
}

impl Visual {
    /// Cuts frame `uv` out of the page for `(layer, id)`.
    pub fn cut(
        atlas: &dyn AtlasLayout,
        layer: Layer,
        id: u16,
        uv: Uv,
        texture: TextureHandle,
        paint: u8,
    ) -> Visual {
        let size = atlas.frame_size(layer, id);
        let pad = atlas.padding() as u32;
        Visual {
            u: uv.u as u32 * (size.width as u32 + pad),
            v: uv.v as u32 * (size.height as u32 + pad),
            width: size.width,
            height: size.height,
            texture,
            paint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cut_steps_by_frame_plus_padding() {
        let reg = TileRegistry::from_toml_str(
            r#"
            padding = 2
            [[tiles]]
            name = "dirt"
            [[tiles]]
            name = "tree"
            frame = [20, 20]
            [[walls]]
            name = "stone_wall"
            "#,
        )
        .unwrap();
        let atlas = RegistryAtlas::from_registry(&reg);
        let v = Visual::cut(&atlas, Layer::Tile, 0, Uv::new(3, 2), TextureHandle::Tile(0), 0);
        assert_eq!((v.u, v.v, v.width, v.height), (54, 36, 16, 16));
        let v = Visual::cut(&atlas, Layer::Tile, 1, Uv::new(1, 1), TextureHandle::Tile(1), 0);
        assert_eq!((v.u, v.v), (22, 22));
        let v = Visual::cut(&atlas, Layer::Wall, 1, Uv::new(1, 0), TextureHandle::Wall(1), 4);
        assert_eq!((v.u, v.width, v.paint), (34, 32, 4));
        assert_eq!(atlas.frame_size(Layer::Tile, 900), FrameSize::TILE);
    }
}

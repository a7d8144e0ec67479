//! GPU texture handles produced by the ingestion pipeline.

use texforge_core::{mip_extent, PixelFormat, Result, UVec2};

use crate::context::with_error_scope;

/// How the layers of a multi-image texture are viewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKind {
    /// A 2D texture array.
    Layers,
    /// A cubemap; needs exactly six faces (+X, -X, +Y, -Y, +Z, -Z).
    Cube,
}

impl ArrayKind {
    #[must_use]
    pub fn view_dimension(self) -> wgpu::TextureViewDimension {
        match self {
            Self::Layers => wgpu::TextureViewDimension::D2Array,
            Self::Cube => wgpu::TextureViewDimension::Cube,
        }
    }
}

/// A mip-mapped texture and its sampling view.
///
/// The handle has a single owner; dropping it releases the GPU memory.
pub struct TextureResource {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    format: PixelFormat,
    view_dimension: wgpu::TextureViewDimension,
    layers: u32,
}

impl TextureResource {
    /// Wraps `texture` and creates its sampling view over the first `layers` layers.
    ///
    /// The allocation may carry more layers than the view exposes (see
    /// [`physical_layer_count`](crate::physical_layer_count)).
    pub(crate) fn new(
        device: &wgpu::Device,
        texture: wgpu::Texture,
        format: PixelFormat,
        view_dimension: wgpu::TextureViewDimension,
        layers: u32,
        label: &str,
    ) -> Result<Self> {
        let view = with_error_scope(device, label, || {
            texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some(label),
                dimension: Some(view_dimension),
                base_array_layer: 0,
                array_layer_count: Some(layers),
                ..Default::default()
            })
        })?;
        Ok(Self {
            texture,
            view,
            format,
            view_dimension,
            layers,
        })
    }

    /// The underlying texture.
    #[must_use]
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// The sampling view covering every level and layer.
    #[must_use]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.texture.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.texture.height()
    }

    #[must_use]
    pub fn mip_level_count(&self) -> u32 {
        self.texture.mip_level_count()
    }

    /// Number of layers holding images (1 for plain 2D textures, 6 for cubemaps).
    #[must_use]
    pub fn layer_count(&self) -> u32 {
        self.layers
    }

    #[must_use]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[must_use]
    pub fn view_dimension(&self) -> wgpu::TextureViewDimension {
        self.view_dimension
    }

    /// Extent of mip `level`.
    #[must_use]
    pub fn level_extent(&self, level: u32) -> UVec2 {
        mip_extent(UVec2::new(self.width(), self.height()), level)
    }
}

impl Drop for TextureResource {
    fn drop(&mut self) {
        self.texture.destroy();
    }
}

impl std::fmt::Debug for TextureResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureResource")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("mip_level_count", &self.mip_level_count())
            .field("layer_count", &self.layer_count())
            .field("format", &self.format)
            .field("view_dimension", &self.view_dimension)
            .finish()
    }
}

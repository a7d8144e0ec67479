//! Mip-chain generation.
//!
//! wgpu has no built-in mip generation, so each level is rendered from the one
//! above it with a fullscreen downsample pass.

use texforge_core::PixelFormat;

use crate::format::texture_format;

/// Downsample pipelines for every [`PixelFormat`], created once per device.
pub struct MipmapGenerator {
    unorm8: wgpu::RenderPipeline,
    unorm8_srgb: wgpu::RenderPipeline,
    float16: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl MipmapGenerator {
    /// Creates the downsample pipelines.
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mip Downsample Bind Group Layout"),
            entries: &[
                // Source level
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mip Downsample Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mip_downsample.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mip Downsample Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let create_pipeline = |format: PixelFormat| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&format!("Mip Downsample Pipeline ({format:?})")),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: texture_format(format),
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        // Linear filtering for the 2x2 box average
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Mip Downsample Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            unorm8: create_pipeline(PixelFormat::Unorm8),
            unorm8_srgb: create_pipeline(PixelFormat::Unorm8Srgb),
            float16: create_pipeline(PixelFormat::Float16),
            bind_group_layout,
            sampler,
        }
    }

    fn pipeline(&self, format: PixelFormat) -> &wgpu::RenderPipeline {
        match format {
            PixelFormat::Unorm8 => &self.unorm8,
            PixelFormat::Unorm8Srgb => &self.unorm8_srgb,
            PixelFormat::Float16 => &self.float16,
        }
    }

    /// Records passes filling levels `1..mip_level_count` of a single-layer 2D
    /// `texture` from level 0.
    ///
    /// Level 0 must already hold the image (the copy has to be recorded earlier
    /// in the same encoder or submitted before). The texture needs
    /// `TEXTURE_BINDING | RENDER_ATTACHMENT` usage. GL backends cannot render
    /// into one layer of an array or cubemap, so layered textures are copied
    /// from per-layer chains (see [`TextureBuilder`](crate::TextureBuilder)).
    pub fn generate(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        texture: &wgpu::Texture,
        format: PixelFormat,
    ) {
        let mip_level_count = texture.mip_level_count();
        let pipeline = self.pipeline(format);

        let level_view = |level: u32| {
            texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some("Mip Level View"),
                dimension: Some(wgpu::TextureViewDimension::D2),
                base_mip_level: level,
                mip_level_count: Some(1),
                ..Default::default()
            })
        };

        for level in 1..mip_level_count {
            let source_view = level_view(level - 1);
            let target_view = level_view(level);

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Mip Downsample Bind Group"),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&source_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Mip Downsample Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, &bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        log::debug!("generated {mip_level_count} mip levels");
    }
}

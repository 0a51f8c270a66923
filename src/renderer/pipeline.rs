//! WebGPU render pipeline setup
//!
//! The particles draw into an offscreen trail texture that survives between
//! frames. Each frame fades it toward black, draws the visible particles on
//! top, then copies it to the swapchain.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::instance::ParticleInstance;
use crate::error::MountError;

/// Trail texture format. Blending happens on sRGB-encoded values, like a 2D canvas.
const TRAIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Initial instance buffer capacity (grows on demand)
const INITIAL_INSTANCES: usize = 1024;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    resolution: [f32; 2], // offset 0, CSS pixels
    fade_alpha: f32,      // offset 8
    srgb_target: u32,     // offset 12
}

/// Offscreen texture holding the accumulated trails
struct Trail {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    blit_bind_group: wgpu::BindGroup,
}

/// Main render state
pub struct FieldRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,

    fade_pipeline: wgpu::RenderPipeline,
    particle_pipeline: wgpu::RenderPipeline,
    blit_pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    blit_layout: wgpu::BindGroupLayout,

    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,

    trail: Trail,
    /// Trail must be cleared on the next frame (new or resized)
    trail_dirty: bool,

    /// Surface size in physical pixels
    pub size: (u32, u32),
    /// Viewport size in CSS pixels
    viewport: (f32, f32),
    fade_alpha: f32,
}

impl FieldRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        size: (u32, u32),
        viewport: (f32, f32),
        fade_alpha: f32,
    ) -> Result<Self, MountError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("field-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .map_err(|e| MountError::Device(e.to_string()))?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        // Prefer a non-sRGB swapchain so the trail can be copied straight through
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| MountError::Surface("surface reports no formats".into()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        log::info!("Using surface format: {:?}", surface_format);

        let (width, height) = (size.0.max(1), size.1.max(1));
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("field_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("field_shader.wgsl").into()),
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals {
                resolution: [viewport.0, viewport.1],
                fade_alpha,
                srgb_target: surface_format.is_srgb() as u32,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let globals_entry = wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_layout"),
            entries: &[globals_entry],
        });

        let blit_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit_layout"),
            entries: &[
                globals_entry,
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let globals_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("globals_pipeline_layout"),
                bind_group_layouts: &[&globals_layout],
                immediate_size: 0,
            });
        let blit_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit_pipeline_layout"),
            bind_group_layouts: &[&blit_layout],
            immediate_size: 0,
        });

        let fade_pipeline = create_pipeline(
            &device,
            "fade_pipeline",
            &globals_pipeline_layout,
            &shader,
            ("vs_fullscreen", "fs_fade"),
            &[],
            TRAIL_FORMAT,
            Some(wgpu::BlendState::ALPHA_BLENDING),
        );
        let particle_pipeline = create_pipeline(
            &device,
            "particle_pipeline",
            &globals_pipeline_layout,
            &shader,
            ("vs_particle", "fs_particle"),
            &[ParticleInstance::desc()],
            TRAIL_FORMAT,
            Some(wgpu::BlendState::ALPHA_BLENDING),
        );
        let blit_pipeline = create_pipeline(
            &device,
            "blit_pipeline",
            &blit_pipeline_layout,
            &shader,
            ("vs_fullscreen", "fs_blit"),
            &[],
            config.format,
            None,
        );

        let instance_buffer = create_instance_buffer(&device, INITIAL_INSTANCES);
        let trail = create_trail(&device, &blit_layout, &globals_buffer, width, height);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            fade_pipeline,
            particle_pipeline,
            blit_pipeline,
            globals_buffer,
            globals_bind_group,
            blit_layout,
            instance_buffer,
            instance_capacity: INITIAL_INSTANCES,
            trail,
            trail_dirty: true,
            size: (width, height),
            viewport,
            fade_alpha,
        })
    }

    /// Resize the swapchain and trail. `size` is physical, `viewport` is CSS pixels.
    pub fn resize(&mut self, size: (u32, u32), viewport: (f32, f32)) {
        if size.0 == 0 || size.1 == 0 {
            return;
        }
        self.size = size;
        self.viewport = viewport;
        self.config.width = size.0;
        self.config.height = size.1;
        self.surface.configure(&self.device, &self.config);
        self.trail = create_trail(
            &self.device,
            &self.blit_layout,
            &self.globals_buffer,
            size.0,
            size.1,
        );
        self.trail_dirty = true;
        self.write_globals();
    }

    /// Reapply the current configuration (after a lost/outdated surface)
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    fn write_globals(&self) {
        let globals = Globals {
            resolution: [self.viewport.0, self.viewport.1],
            fade_alpha: self.fade_alpha,
            srgb_target: self.config.format.is_srgb() as u32,
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
    }

    /// Upload instances, fade the trail, draw, and present.
    ///
    /// With `advance_trail` false the trail is presented unchanged, so trails
    /// fade once per simulation tick rather than once per display frame.
    pub fn render(
        &mut self,
        instances: &[ParticleInstance],
        advance_trail: bool,
    ) -> Result<(), wgpu::SurfaceError> {
        let Some(load) = trail_load_op(self.trail_dirty, advance_trail) else {
            return self.present_trail();
        };

        if instances.len() > self.instance_capacity {
            self.instance_capacity = instances.len().next_power_of_two();
            self.instance_buffer = create_instance_buffer(&self.device, self.instance_capacity);
            log::debug!("Instance buffer grown to {}", self.instance_capacity);
        }
        if !instances.is_empty() {
            self.queue
                .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(instances));
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("field_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("trail_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.trail.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);

            render_pass.set_pipeline(&self.fade_pipeline);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle

            if !instances.is_empty() {
                render_pass.set_pipeline(&self.particle_pipeline);
                render_pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
                render_pass.draw(0..6, 0..instances.len() as u32);
            }
        }
        self.trail_dirty = false;

        self.blit(&mut encoder, &view);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Copy the trail to the swapchain without touching it
    fn present_trail(&self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("present_encoder"),
            });
        self.blit(&mut encoder, &view);
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn blit(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("blit_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        render_pass.set_pipeline(&self.blit_pipeline);
        render_pass.set_bind_group(0, &self.trail.blit_bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}

/// How the trail pass should start, or `None` to leave the trail as is.
/// A fresh trail is always cleared and drawn.
fn trail_load_op(dirty: bool, advance: bool) -> Option<wgpu::LoadOp<wgpu::Color>> {
    if dirty {
        Some(wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT))
    } else if advance {
        Some(wgpu::LoadOp::Load)
    } else {
        None
    }
}

#[allow(clippy::too_many_arguments)]
fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    (vs, fs): (&str, &str),
    buffers: &[wgpu::VertexBufferLayout<'_>],
    format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs),
            buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("particle_instances"),
        size: (std::mem::size_of::<ParticleInstance>() * capacity) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_trail(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    globals_buffer: &wgpu::Buffer,
    width: u32,
    height: u32,
) -> Trail {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("trail"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TRAIL_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let blit_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("blit_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&view),
            },
        ],
    });
    Trail {
        _texture: texture,
        view,
        blit_bind_group,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trail_only_advances_on_ticked_frames() {
        assert!(trail_load_op(false, false).is_none());
        assert!(matches!(trail_load_op(false, true), Some(wgpu::LoadOp::Load)));
    }

    #[test]
    fn test_fresh_trail_is_cleared_even_without_ticks() {
        for advance in [false, true] {
            assert!(matches!(
                trail_load_op(true, advance),
                Some(wgpu::LoadOp::Clear(_))
            ));
        }
    }
}

//! SDF-based WebGPU render pipeline
//!
//! Renders the entire scene in fragment shader using signed distance fields.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::consts::*;
use crate::sim::{GamePhase, GameState, Road, SpriteId};
use crate::viewport_fit;

/// Maximum number of obstacles supported
const MAX_OBSTACLES: usize = 64;

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    resolution: [f32; 2],  // offset 0
    view_offset: [f32; 2], // offset 8 - letterbox origin in canvas pixels
    view_scale: f32,       // offset 16 - virtual-to-canvas pixel scale
    time: f32,             // offset 20
    road_scroll: f32,      // offset 24 - how far the road has rushed past
    road_start_x: f32,     // offset 28
    road_width: f32,       // offset 32
    lane_width: f32,       // offset 36
    phase: u32,            // offset 40 - 0 title, 1 playing, 2 game over
    obstacle_count: u32,   // offset 44
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct CarUniform {
    rect: [f32; 4], // x, y, w, h in virtual pixels
    sprite: u32,
    _pad: [u32; 3], // pad to 32 bytes for alignment
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ObstacleData {
    rect: [f32; 4],
    sprite: u32,
    _pad: [u32; 3], // pad to 32 bytes for alignment
}

fn sprite_index(sprite: SpriteId) -> u32 {
    match sprite {
        SpriteId::Roadster => 0,
        SpriteId::Cruiser => 1,
    }
}

// ============================================================================
// SDF RENDER STATE
// ============================================================================

pub struct SdfRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    // Uniform buffers
    globals_buffer: wgpu::Buffer,
    car_buffer: wgpu::Buffer,
    obstacles_buffer: wgpu::Buffer,

    bind_group: wgpu::BindGroup,

    pub size: (u32, u32),

    // Cosmetic road scroll, integrated from frame time
    last_time: f64,
    road_scroll: f32,
}

impl SdfRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Self {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("sdf-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);
        log::info!("Surface alpha modes: {:?}", surface_caps.alpha_modes);
        log::info!("Surface present modes: {:?}", surface_caps.present_modes);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        log::info!(
            "Surface config: {}x{}, alpha: {:?}",
            width,
            height,
            config.alpha_mode
        );
        surface.configure(&device, &config);

        // Create shader
        log::info!("Creating shader module...");
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sdf_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sdf_shader.wgsl").into()),
        });
        log::info!("Shader module created");

        // Create buffers
        let road = Road::new(VIRTUAL_WIDTH);
        let (view_scale, view_offset) = viewport_fit(width as f32, height as f32);
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals {
                resolution: [width as f32, height as f32],
                view_offset: [view_offset.x, view_offset.y],
                view_scale,
                time: 0.0,
                road_scroll: 0.0,
                road_start_x: road.start_x,
                road_width: road.width,
                lane_width: road.lane_width,
                phase: 0,
                obstacle_count: 0,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let car_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("car"),
            contents: bytemuck::bytes_of(&CarUniform {
                rect: [0.0; 4],
                sprite: 0,
                _pad: [0; 3],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let obstacles_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("obstacles"),
            size: (std::mem::size_of::<ObstacleData>() * MAX_OBSTACLES) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Bind group layout
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sdf_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sdf_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: car_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: obstacles_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sdf_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sdf_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // No vertex buffers - fullscreen triangle
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
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
        });

        Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            car_buffer,
            obstacles_buffer,
            bind_group,
            size: (width, height),
            last_time: 0.0,
            road_scroll: 0.0,
        }
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Update GPU buffers from game state and render
    pub fn render(&mut self, state: &GameState, time: f64) -> Result<(), wgpu::SurfaceError> {
        // time is ms since page load from requestAnimationFrame, convert to seconds
        let elapsed = (time / 1000.0) as f32;

        // Scroll the lane markings past at traffic speed while driving
        let frame_dt = ((time - self.last_time) / 1000.0).clamp(0.0, 0.1) as f32;
        self.last_time = time;
        if state.phase == GamePhase::Playing {
            let speed = state
                .obstacles
                .iter()
                .map(|o| o.vertical_speed)
                .fold(OBSTACLE_START_SPEED, f32::max);
            self.road_scroll += speed * frame_dt;
        }

        let obstacle_count = state.obstacles.len().min(MAX_OBSTACLES) as u32;

        let phase = match state.phase {
            GamePhase::Title => 0,
            GamePhase::Playing => 1,
            GamePhase::GameOver => 2,
        };

        let (view_scale, view_offset) = viewport_fit(self.size.0 as f32, self.size.1 as f32);

        // Update globals
        let globals = Globals {
            resolution: [self.size.0 as f32, self.size.1 as f32],
            view_offset: [view_offset.x, view_offset.y],
            view_scale,
            time: elapsed,
            road_scroll: self.road_scroll,
            road_start_x: state.road.start_x,
            road_width: state.road.width,
            lane_width: state.road.lane_width,
            phase,
            obstacle_count,
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        // Update the player car
        let bounds = state.car.body.bounds;
        let car = CarUniform {
            rect: [bounds.x, bounds.y, bounds.w, bounds.h],
            sprite: sprite_index(state.car.body.sprite),
            _pad: [0; 3],
        };
        self.queue
            .write_buffer(&self.car_buffer, 0, bytemuck::bytes_of(&car));

        // Update obstacles
        let mut obstacles_data = vec![
            ObstacleData {
                rect: [0.0; 4],
                sprite: 0,
                _pad: [0; 3]
            };
            MAX_OBSTACLES
        ];
        for (i, obstacle) in state.obstacles.iter().take(MAX_OBSTACLES).enumerate() {
            let bounds = obstacle.body.bounds;
            obstacles_data[i] = ObstacleData {
                rect: [bounds.x, bounds.y, bounds.w, bounds.h],
                sprite: sprite_index(obstacle.body.sprite),
                _pad: [0; 3],
            };
        }
        self.queue.write_buffer(
            &self.obstacles_buffer,
            0,
            bytemuck::cast_slice(&obstacles_data),
        );

        // Render
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sdf_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sdf_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
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

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

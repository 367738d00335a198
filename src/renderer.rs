// File: renderer.rs
//! Windowed renderer. The simulation runs on its own thread and hands each
//! frame to the event loop over a bounded channel.

use crate::config::SimulationConfig;
use crate::display::{Frame, RenderControl, Renderer};
use crate::error::SimError;
use crate::population::Species;
use crate::simulation::{SimulationReport, run_simulation};
use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError};
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use wgpu::util::DeviceExt;
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowBuilder},
};

const BACKGROUND_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};
const POINT_SIZE_PX: f32 = 2.0;
const FRAME_QUEUE_DEPTH: usize = 2;

fn species_color(species: Species) -> [f32; 4] {
    match species {
        Species::Plant => [0.1, 0.8, 0.1, 1.0],
        Species::Herbivore => [0.2, 0.3, 0.95, 1.0],
        Species::Predator => [0.9, 0.1, 0.1, 1.0],
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no suitable graphics adapter found")]
    NoAdapter,
    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,
    #[error(transparent)]
    Device(#[from] wgpu::RequestDeviceError),
    #[error(transparent)]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error(transparent)]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error(transparent)]
    Window(#[from] winit::error::OsError),
    #[error(transparent)]
    Simulation(#[from] SimError),
}

/// Owned copy of one frame, sent from the simulation thread to the window.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub tick: u64,
    pub positions: [Vec<Vec2>; 3],
}

impl Snapshot {
    fn capture(frame: &Frame<'_>) -> Self {
        Self {
            tick: frame.tick,
            positions: Species::ALL.map(|species| frame.positions(species).to_vec()),
        }
    }

    fn count(&self, species: Species) -> usize {
        self.positions[species.index()].len()
    }
}

/// Coordinator-side end of the window channel.
pub struct ChannelRenderer {
    frames: SyncSender<Snapshot>,
    quit: Arc<AtomicBool>,
}

impl ChannelRenderer {
    pub fn new(frames: SyncSender<Snapshot>, quit: Arc<AtomicBool>) -> Self {
        Self { frames, quit }
    }
}

impl Renderer for ChannelRenderer {
    fn present(&mut self, frame: &Frame<'_>) -> RenderControl {
        if self.quit.load(Ordering::Relaxed) {
            return RenderControl::Quit;
        }
        // Blocks while the window is behind; fails once the window is gone
        match self.frames.send(Snapshot::capture(frame)) {
            Ok(()) => RenderControl::Continue,
            Err(_) => RenderControl::Quit,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct Globals {
    half_extent: [f32; 2],
    _padding: [f32; 2],
}

impl Globals {
    fn for_size(size: PhysicalSize<u32>) -> Self {
        Self {
            half_extent: [
                POINT_SIZE_PX / size.width as f32,
                POINT_SIZE_PX / size.height as f32,
            ],
            _padding: [0.0; 2],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct QuadVertex {
    corner: [f32; 2],
}

impl QuadVertex {
    fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x2],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct PointInstance {
    center: [f32; 2],
    color: [f32; 4],
}

impl PointInstance {
    fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PointInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &wgpu::vertex_attr_array![1 => Float32x2, 2 => Float32x4],
        }
    }
}

const QUAD: [QuadVertex; 6] = [
    QuadVertex { corner: [-1.0, -1.0] },
    QuadVertex { corner: [1.0, -1.0] },
    QuadVertex { corner: [-1.0, 1.0] },
    QuadVertex { corner: [-1.0, 1.0] },
    QuadVertex { corner: [1.0, -1.0] },
    QuadVertex { corner: [1.0, 1.0] },
];

/// Draws every organism as a small colored square.
pub struct PointRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    pipeline: wgpu::RenderPipeline,
    quad_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    instances: Vec<PointInstance>,
}

impl PointRenderer {
    pub async fn new(window: Arc<Window>, capacity: usize) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let size = PhysicalSize::new(size.width.max(1), size.height.max(1));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("EnvSim Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(RenderError::NoSurfaceFormat)?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Point Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(&QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let instance_capacity = capacity.max(1024);
        let instance_buffer = Self::create_instance_buffer(&device, instance_capacity);
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals Buffer"),
            contents: bytemuck::cast_slice(&[Globals::for_size(size)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<Globals>() as _),
                },
                count: None,
            }],
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Pipeline Layout"),
            bind_group_layouts: &[&globals_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Point Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::desc(), PointInstance::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            pipeline,
            quad_buffer,
            instance_buffer,
            instance_capacity,
            globals_buffer,
            globals_bind_group,
            instances: Vec::with_capacity(instance_capacity),
        })
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Point Instance Buffer"),
            size: (capacity * std::mem::size_of::<PointInstance>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let new_size = PhysicalSize::new(new_size.width.max(1), new_size.height.max(1));
        if new_size == self.size {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::cast_slice(&[Globals::for_size(new_size)]),
        );
        log::debug!("window resized to {}x{}", new_size.width, new_size.height);
    }

    pub fn render(&mut self, snapshot: &Snapshot) -> Result<(), wgpu::SurfaceError> {
        self.instances.clear();
        for species in Species::ALL {
            let color = species_color(species);
            self.instances.extend(
                snapshot.positions[species.index()]
                    .iter()
                    // World y grows downwards
                    .map(|p| PointInstance {
                        center: [p.x, -p.y],
                        color,
                    }),
            );
        }

        if self.instances.len() > self.instance_capacity {
            self.instance_capacity = self.instances.len().next_power_of_two();
            self.instance_buffer = Self::create_instance_buffer(&self.device, self.instance_capacity);
            log::debug!("instance buffer grown to {}", self.instance_capacity);
        }
        if !self.instances.is_empty() {
            self.queue
                .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&self.instances));
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Point Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Point Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(BACKGROUND_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.globals_bind_group, &[]);
            pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            pass.draw(0..QUAD.len() as u32, 0..self.instances.len() as u32);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// Opens a window, runs the simulation behind it and returns once both are done.
pub fn run_windowed(config: SimulationConfig) -> Result<SimulationReport, RenderError> {
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("EnvSim")
            .with_inner_size(PhysicalSize::new(
                config.bounds.width as u32,
                config.bounds.height as u32,
            ))
            .build(&event_loop)?,
    );
    let mut points = pollster::block_on(PointRenderer::new(
        window.clone(),
        config.populations.total(),
    ))?;

    let (frames_tx, frames_rx) = mpsc::sync_channel(FRAME_QUEUE_DEPTH);
    let quit = Arc::new(AtomicBool::new(false));
    let channel = ChannelRenderer::new(frames_tx, quit.clone());
    let simulation = thread::Builder::new()
        .name("simulation".to_string())
        .spawn(move || run_simulation(&config, channel))
        .map_err(|source| SimError::Spawn {
            node: "simulation".to_string(),
            source,
        })?;

    let mut latest = Snapshot::default();
    event_loop.run(move |event, elwt: &EventLoopWindowTarget<()>| {
        elwt.set_control_flow(ControlFlow::Poll);
        match event {
            Event::AboutToWait => match drain_frames(&frames_rx) {
                Ok(Some(snapshot)) => {
                    latest = snapshot;
                    window.request_redraw();
                }
                Ok(None) => {}
                Err(TryRecvError::Disconnected) => elwt.exit(),
                Err(TryRecvError::Empty) => {}
            },
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    quit.store(true, Ordering::Relaxed);
                    elwt.exit();
                }
                WindowEvent::Resized(size) => points.resize(size),
                WindowEvent::KeyboardInput {
                    event: key_event, ..
                } if key_event.state == ElementState::Pressed => match key_event.physical_key {
                    PhysicalKey::Code(KeyCode::KeyQ) | PhysicalKey::Code(KeyCode::Escape) => {
                        quit.store(true, Ordering::Relaxed);
                        elwt.exit();
                    }
                    _ => {}
                },
                WindowEvent::RedrawRequested => {
                    match points.render(&latest) {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost) => points.resize(window.inner_size()),
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("surface out of memory");
                            quit.store(true, Ordering::Relaxed);
                            elwt.exit();
                        }
                        Err(e) => log::warn!("surface error: {:?}", e),
                    }
                    window.set_title(&format!(
                        "EnvSim - tick {} - Plants: {}, Herbivores: {}, Predators: {}",
                        latest.tick,
                        latest.count(Species::Plant),
                        latest.count(Species::Herbivore),
                        latest.count(Species::Predator)
                    ));
                }
                _ => {}
            },
            _ => {}
        }
    })?;

    let report = simulation
        .join()
        .map_err(|_| SimError::Panicked {
            node: "simulation".to_string(),
        })??;
    Ok(report)
}

/// Keeps only the newest pending frame. Disconnected means the run is over.
fn drain_frames(frames: &Receiver<Snapshot>) -> Result<Option<Snapshot>, TryRecvError> {
    let mut newest = None;
    loop {
        match frames.try_recv() {
            Ok(snapshot) => newest = Some(snapshot),
            Err(TryRecvError::Empty) => return Ok(newest),
            Err(TryRecvError::Disconnected) if newest.is_some() => return Ok(newest),
            Err(err) => return Err(err),
        }
    }
}

//! Browser glue
//!
//! Mounts the field on a canvas, wires window input into the simulation and
//! drives it from `requestAnimationFrame` until [`Mount::unmount`].

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, EventTarget, HtmlCanvasElement, MouseEvent, WheelEvent,
    Window,
};

use super::FrameClock;
use crate::error::MountError;
use crate::renderer::{FieldRenderState, ParticleInstance, build_instances};
use crate::scroll::{SmoothScroll, WheelUnit};
use crate::settings::Settings;
use crate::sim::{FieldState, PointerPress, SpawnMode, TickInput, WorldBounds, tick};

/// Everything the frame loop and the input handlers share
struct App {
    window: Window,
    document: Document,
    canvas: HtmlCanvasElement,
    state: FieldState,
    render_state: FieldRenderState,
    /// Present when smooth scrolling is on
    scroll: Option<SmoothScroll>,
    input: TickInput,
    clock: FrameClock,
    instances: Vec<ParticleInstance>,
}

impl App {
    /// Current page scroll, advancing the smooth scroller if there is one
    fn scroll_offset(&mut self) -> f32 {
        let native = self.window.scroll_y().unwrap_or(0.0) as f32;
        let Some(scroll) = self.scroll.as_mut() else {
            return native;
        };
        scroll.sync(native);
        if let Some(y) = scroll.advance() {
            self.window.scroll_to_with_x_and_y(0.0, y as f64);
        }
        scroll.current()
    }

    fn frame(&mut self, time: f64) {
        let scroll_y = self.scroll_offset();
        self.input.scroll_y = scroll_y;

        let ticks = self.clock.advance(time);
        for _ in 0..ticks {
            tick(&mut self.state, &self.input);
            // Clear one-shot inputs after processing
            self.input.pointer = None;
            self.input.presses.clear();
        }

        build_instances(&self.state, scroll_y, &mut self.instances);
        match self.render_state.render(&self.instances, ticks > 0) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.render_state.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory!");
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }

    fn resize(&mut self) {
        let (world, dpr) = measure(&self.window, &self.document);
        let size = physical_size(world, dpr);
        self.canvas.set_width(size.0);
        self.canvas.set_height(size.1);
        self.render_state.resize(size, (world.width, world.height));
        self.state.resize(world);
        if let Some(scroll) = self.scroll.as_mut() {
            scroll.set_limit(world.scroll_limit());
        }
    }

    fn pointer_moved(&mut self, event: &MouseEvent) {
        self.input.pointer = Some(Vec2::new(event.client_x() as f32, event.client_y() as f32));
    }

    fn pointer_pressed(&mut self, event: &MouseEvent) {
        let scroll_y = match &self.scroll {
            Some(scroll) => scroll.current(),
            None => self.window.scroll_y().unwrap_or(0.0) as f32,
        };
        self.input.presses.push(PointerPress {
            pos: Vec2::new(event.client_x() as f32, event.client_y() as f32),
            scroll_y,
        });
    }

    fn wheel(&mut self, event: &WheelEvent) {
        let viewport_height = self.state.world.height;
        if let Some(scroll) = self.scroll.as_mut() {
            event.prevent_default();
            scroll.on_wheel(
                event.delta_y() as f32,
                WheelUnit::from_delta_mode(event.delta_mode()),
                viewport_height,
            );
        }
    }
}

/// A registered DOM listener, kept so it can be removed again
struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

struct Shared {
    app: RefCell<App>,
    cancelled: Cell<bool>,
    frame_id: Cell<Option<i32>>,
    frame_callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    listeners: RefCell<Vec<Listener>>,
}

/// Handle to a running background. Dropping it tears the background down.
pub struct Mount {
    shared: Rc<Shared>,
}

impl Mount {
    /// Stop the loop and detach every listener. Safe to call twice.
    pub fn unmount(&self) {
        if self.shared.cancelled.replace(true) {
            return;
        }
        let window = self.shared.app.borrow().window.clone();
        if let Some(id) = self.shared.frame_id.take() {
            let _ = window.cancel_animation_frame(id);
        }
        for listener in self.shared.listeners.borrow_mut().drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.event,
                listener.closure.as_ref().unchecked_ref(),
            );
        }
        self.shared.frame_callback.borrow_mut().take();
        log::info!("Particle field unmounted");
    }
}

impl Drop for Mount {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Attach the particle field to the canvas with id `canvas_id`
pub async fn mount(canvas_id: &str, settings: &Settings) -> Result<Mount, MountError> {
    let window = web_sys::window().ok_or(MountError::NoWindow)?;
    let document = window.document().ok_or(MountError::NoWindow)?;

    let canvas: HtmlCanvasElement = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| MountError::CanvasMissing(canvas_id.to_string()))?
        .dyn_into()
        .map_err(|_| MountError::NotACanvas(canvas_id.to_string()))?;

    let (world, dpr) = measure(&window, &document);
    let size = physical_size(world, dpr);
    canvas.set_width(size.0);
    canvas.set_height(size.1);

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
        ..Default::default()
    });
    let surface = instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
        .map_err(|e| MountError::Surface(e.to_string()))?;
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .map_err(|e| MountError::Adapter(e.to_string()))?;

    log::info!("Using adapter: {:?}", adapter.get_info().name);

    let tuning = settings.tuning();
    let render_state = FieldRenderState::new(
        surface,
        &adapter,
        size,
        (world.width, world.height),
        tuning.fade_alpha,
    )
    .await?;

    let seed = js_sys::Date::now() as u64;
    let mut state = FieldState::new(seed, world, tuning);
    state.prefill = settings.prefill;
    if state.prefill {
        state.fill(SpawnMode::Scatter);
    }
    log::info!("Particle field initialized with seed: {}", seed);

    let scroll = settings.effective_smooth_scroll().then(|| {
        let mut scroll = SmoothScroll::default();
        scroll.set_limit(world.scroll_limit());
        scroll.sync(window.scroll_y().unwrap_or(0.0) as f32);
        scroll
    });
    let smooth = scroll.is_some();

    let shared = Rc::new(Shared {
        app: RefCell::new(App {
            window: window.clone(),
            document,
            canvas,
            state,
            render_state,
            scroll,
            input: TickInput::default(),
            clock: FrameClock::new(),
            instances: Vec::new(),
        }),
        cancelled: Cell::new(false),
        frame_id: Cell::new(None),
        frame_callback: RefCell::new(None),
        listeners: RefCell::new(Vec::new()),
    });
    let mount = Mount {
        shared: shared.clone(),
    };

    let target: &EventTarget = window.as_ref();
    listen(&shared, target, "resize", true, |app, _event| app.resize())?;
    listen(&shared, target, "mousemove", true, |app, event| {
        if let Some(event) = event.dyn_ref::<MouseEvent>() {
            app.pointer_moved(event);
        }
    })?;
    listen(&shared, target, "mousedown", true, |app, event| {
        if let Some(event) = event.dyn_ref::<MouseEvent>() {
            app.pointer_pressed(event);
        }
    })?;
    if smooth {
        // Must be non-passive to take over the wheel
        listen(&shared, target, "wheel", false, |app, event| {
            if let Some(event) = event.dyn_ref::<WheelEvent>() {
                app.wheel(event);
            }
        })?;
    }

    let weak = Rc::downgrade(&shared);
    let callback = Closure::<dyn FnMut(f64)>::new(move |time: f64| on_frame(&weak, time));
    *shared.frame_callback.borrow_mut() = Some(callback);
    schedule_frame(&shared);

    log::info!(
        "Particle field running ({} particles max, smooth scroll {})",
        shared.app.borrow().state.tuning.capacity,
        if smooth { "on" } else { "off" }
    );
    Ok(mount)
}

fn on_frame(weak: &Weak<Shared>, time: f64) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    if shared.cancelled.get() {
        return;
    }
    shared.frame_id.set(None);
    shared.app.borrow_mut().frame(time);
    schedule_frame(&shared);
}

fn schedule_frame(shared: &Rc<Shared>) {
    if shared.cancelled.get() {
        return;
    }
    let window = shared.app.borrow().window.clone();
    let callback = shared.frame_callback.borrow();
    let Some(callback) = callback.as_ref() else {
        return;
    };
    match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
        Ok(id) => shared.frame_id.set(Some(id)),
        Err(e) => log::warn!("requestAnimationFrame failed: {:?}", e),
    }
}

fn listen(
    shared: &Rc<Shared>,
    target: &EventTarget,
    event: &'static str,
    passive: bool,
    mut handler: impl FnMut(&mut App, web_sys::Event) + 'static,
) -> Result<(), MountError> {
    let weak = Rc::downgrade(shared);
    let closure = Closure::<dyn FnMut(_)>::new(move |e: web_sys::Event| {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        if shared.cancelled.get() {
            return;
        }
        handler(&mut shared.app.borrow_mut(), e);
    });

    let options = AddEventListenerOptions::new();
    options.set_passive(passive);
    target
        .add_event_listener_with_callback_and_add_event_listener_options(
            event,
            closure.as_ref().unchecked_ref(),
            &options,
        )
        .map_err(|_| MountError::Listener(event))?;

    shared.listeners.borrow_mut().push(Listener {
        target: target.clone(),
        event,
        closure,
    });
    Ok(())
}

/// Viewport + document extent (CSS pixels) and the device pixel ratio
fn measure(window: &Window, document: &Document) -> (WorldBounds, f64) {
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0) as f32;
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0) as f32;
    let world_height = document
        .document_element()
        .map(|el| el.scroll_height() as f32)
        .unwrap_or(height);
    (
        WorldBounds::new(width, height, world_height),
        window.device_pixel_ratio(),
    )
}

fn physical_size(world: WorldBounds, dpr: f64) -> (u32, u32) {
    (
        ((world.width as f64 * dpr) as u32).max(1),
        ((world.height as f64 * dpr) as u32).max(1),
    )
}

//! Game overlay lifecycle
//!
//! The Space Adventure overlay owns the whole game while mounted: one
//! [`Game`] (simulation plus input arbiter) driven by the host's frame
//! callback, and a close path that cancels the scheduled frame and removes
//! every listener it registered. Nothing about a session survives unmount.

use crate::consts::{MAX_DT_FACTOR, NOMINAL_FRAME_MS};
use crate::sim::input::{InputArbiter, Profile};
use crate::sim::state::GameState;
use crate::sim::tick::tick;

/// Simulation plus its input arbiter, stepped once per host frame
pub struct Game {
    pub state: GameState,
    pub arbiter: InputArbiter,
    last_time_ms: Option<f64>,
}

impl Game {
    pub fn new(seed: u64, profile: Profile) -> Self {
        Self {
            state: GameState::new(seed),
            arbiter: InputArbiter::new(profile),
            last_time_ms: None,
        }
    }

    /// Begin (or restart) a run
    pub fn start(&mut self) {
        self.arbiter.reset();
        self.state.start();
    }

    /// Advance one frame at the host timestamp. The elapsed wall time is
    /// normalized against the nominal frame interval and capped so a
    /// backgrounded tab does not fast-forward the run on return.
    pub fn frame(&mut self, now_ms: f64) {
        let dt = match self.last_time_ms {
            Some(last) => (((now_ms - last) / NOMINAL_FRAME_MS) as f32).clamp(0.0, MAX_DT_FACTOR),
            None => 1.0,
        };
        self.last_time_ms = Some(now_ms);
        let input = self.arbiter.sample(now_ms);
        tick(&mut self.state, &input, dt);
    }
}

/// Mounted overlay: the game plus a one-shot close notification
pub struct Overlay {
    pub game: Game,
    closed: bool,
    on_close: Option<Box<dyn FnOnce()>>,
}

impl Overlay {
    pub fn new(game: Game, on_close: impl FnOnce() + 'static) -> Self {
        Self {
            game,
            closed: false,
            on_close: Some(Box::new(on_close)),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Step the overlay for one frame. Returns false once closed; the
    /// caller must stop scheduling frames when it does.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        if self.closed {
            return false;
        }
        self.game.frame(now_ms);
        true
    }

    /// Close the overlay. Idempotent; the notification fires once.
    pub fn request_close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        log::info!(
            "overlay closed at score {} (best {})",
            self.game.state.score,
            self.game.state.best_score
        );
        if let Some(notify) = self.on_close.take() {
            notify();
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use dom::OverlayHandle;

#[cfg(target_arch = "wasm32")]
mod dom {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{
        CanvasRenderingContext2d, Document, EventTarget, HtmlCanvasElement, HtmlElement,
        KeyboardEvent, MouseEvent, TouchEvent, Window,
    };

    use super::{Game, Overlay};
    use crate::consts::{FIELD_SIZE, PLAYER_SIZE};
    use crate::pixel_to_field;
    use crate::sim::input::{Key, Profile};
    use crate::sim::state::{DropKind, GamePhase};

    const MOBILE_BREAKPOINT_PX: f64 = 768.0;

    fn now_ms() -> f64 {
        js_sys::Date::now()
    }

    /// Run a callback on the next macrotask, outside any listener that is
    /// currently executing. `once_into_js` hands ownership to the JS side,
    /// which frees the closure after the call.
    fn defer(f: impl FnOnce() + 'static) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let fire = Closure::once_into_js(f);
        let _ =
            window.set_timeout_with_callback_and_timeout_and_arguments_0(fire.unchecked_ref(), 0);
    }

    /// Event listener that unregisters itself when dropped
    struct ListenerGuard {
        target: EventTarget,
        kind: &'static str,
        closure: Closure<dyn FnMut(web_sys::Event)>,
    }

    impl ListenerGuard {
        fn listen(
            target: &EventTarget,
            kind: &'static str,
            handler: impl FnMut(web_sys::Event) + 'static,
        ) -> Result<Self, JsValue> {
            let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
            target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
            Ok(Self {
                target: target.clone(),
                kind,
                closure,
            })
        }
    }

    impl Drop for ListenerGuard {
        fn drop(&mut self) {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
        }
    }

    type RafSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

    /// The mounted overlay DOM. Dropping the handle cancels the scheduled
    /// frame, removes all listeners and tears the elements down.
    pub struct OverlayHandle {
        overlay: Rc<RefCell<Overlay>>,
        root: HtmlElement,
        raf_id: Rc<Cell<Option<i32>>>,
        raf: RafSlot,
        _guards: Vec<ListenerGuard>,
    }

    impl OverlayHandle {
        /// Build the overlay DOM, wire input, and start the frame loop.
        /// `on_closed` fires once, on a fresh task, after the user closes
        /// the game; the app should drop the handle there.
        pub fn mount(on_closed: impl FnOnce() + 'static) -> Result<Self, JsValue> {
            let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
            let document = window
                .document()
                .ok_or_else(|| JsValue::from_str("no document"))?;

            let profile = match window.inner_width()?.as_f64() {
                Some(w) if w < MOBILE_BREAKPOINT_PX => Profile::Mobile,
                _ => Profile::Desktop,
            };

            let (root, canvas, ctx) = build_dom(&document)?;

            let seed = now_ms() as u64;
            log::info!("mounting game overlay, seed {seed}, profile {profile:?}");

            let overlay = Rc::new(RefCell::new(Overlay::new(
                Game::new(seed, profile),
                move || defer(on_closed),
            )));
            overlay.borrow_mut().game.start();

            let guards = wire_input(&window, &document, &root, &canvas, &overlay)?;

            let raf_id = Rc::new(Cell::new(None));
            let raf = start_frame_loop(&overlay, &root, &canvas, &ctx, &raf_id);

            Ok(Self {
                overlay,
                root,
                raf_id,
                raf,
                _guards: guards,
            })
        }

        pub fn request_close(&self) {
            self.overlay.borrow_mut().request_close();
        }
    }

    impl Drop for OverlayHandle {
        fn drop(&mut self) {
            if let Some(id) = self.raf_id.take()
                && let Some(window) = web_sys::window()
            {
                let _ = window.cancel_animation_frame(id);
            }
            self.raf.borrow_mut().take();
            self.root.remove();
        }
    }

    fn build_dom(
        document: &Document,
    ) -> Result<(HtmlElement, HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
        let root: HtmlElement = document.create_element("div")?.dyn_into()?;
        root.set_id("space-adventure-overlay");
        let style = root.style();
        style.set_property("position", "fixed")?;
        style.set_property("inset", "0")?;
        style.set_property("background", "rgba(4, 6, 18, 0.95)")?;
        style.set_property("z-index", "1000")?;
        style.set_property("display", "flex")?;
        style.set_property("align-items", "center")?;
        style.set_property("justify-content", "center")?;

        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        resize_canvas(&canvas);
        canvas.style().set_property("touch-action", "none")?;
        root.append_child(&canvas)?;

        let close: HtmlElement = document.create_element("button")?.dyn_into()?;
        close.set_id("space-adventure-close");
        close.set_text_content(Some("\u{2715}"));
        let close_style = close.style();
        close_style.set_property("position", "absolute")?;
        close_style.set_property("top", "16px")?;
        close_style.set_property("right", "16px")?;
        close_style.set_property("font-size", "24px")?;
        root.append_child(&close)?;

        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("no body"))?;
        body.append_child(&root)?;

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;
        Ok((root, canvas, ctx))
    }

    /// Pointer/touch coordinates relative to the canvas, in field units
    fn field_pos(canvas: &HtmlCanvasElement, client_x: f64, client_y: f64) -> Vec2 {
        let rect = canvas.get_bounding_client_rect();
        pixel_to_field(
            (client_x - rect.left()) as f32,
            (client_y - rect.top()) as f32,
            rect.width() as f32,
            rect.height() as f32,
        )
    }

    fn wire_input(
        window: &Window,
        document: &Document,
        root: &HtmlElement,
        canvas: &HtmlCanvasElement,
        overlay: &Rc<RefCell<Overlay>>,
    ) -> Result<Vec<ListenerGuard>, JsValue> {
        let mut guards = Vec::new();

        {
            let overlay = Rc::clone(overlay);
            guards.push(ListenerGuard::listen(
                document,
                "keydown",
                move |event: web_sys::Event| {
                    let Ok(event) = event.dyn_into::<KeyboardEvent>() else {
                        return;
                    };
                    let key = event.key();
                    let mut overlay = overlay.borrow_mut();
                    match key.as_str() {
                        "Escape" => overlay.request_close(),
                        " " => {
                            event.prevent_default();
                            overlay.game.arbiter.request_shoot(now_ms());
                        }
                        "Enter" => {
                            if overlay.game.state.phase == GamePhase::GameOver {
                                overlay.game.start();
                            }
                        }
                        other => {
                            if let Some(key) = Key::from_dom(other) {
                                event.prevent_default();
                                overlay.game.arbiter.key_down(key);
                            }
                        }
                    }
                },
            )?);
        }

        {
            let overlay = Rc::clone(overlay);
            guards.push(ListenerGuard::listen(
                document,
                "keyup",
                move |event: web_sys::Event| {
                    let Ok(event) = event.dyn_into::<KeyboardEvent>() else {
                        return;
                    };
                    if let Some(key) = Key::from_dom(&event.key()) {
                        overlay.borrow_mut().game.arbiter.key_up(key);
                    }
                },
            )?);
        }

        {
            let overlay = Rc::clone(overlay);
            let canvas_ref = canvas.clone();
            guards.push(ListenerGuard::listen(
                canvas,
                "mousemove",
                move |event: web_sys::Event| {
                    let Ok(event) = event.dyn_into::<MouseEvent>() else {
                        return;
                    };
                    let pos = field_pos(&canvas_ref, event.client_x().into(), event.client_y().into());
                    overlay.borrow_mut().game.arbiter.pointer_moved(pos);
                },
            )?);
        }

        {
            let overlay = Rc::clone(overlay);
            guards.push(ListenerGuard::listen(canvas, "mouseleave", move |_| {
                overlay.borrow_mut().game.arbiter.pointer_left();
            })?);
        }

        {
            let overlay = Rc::clone(overlay);
            guards.push(ListenerGuard::listen(canvas, "mousedown", move |_| {
                overlay.borrow_mut().game.arbiter.request_shoot(now_ms());
            })?);
        }

        {
            let overlay = Rc::clone(overlay);
            let canvas_ref = canvas.clone();
            guards.push(ListenerGuard::listen(
                canvas,
                "touchstart",
                move |event: web_sys::Event| {
                    let Ok(event) = event.dyn_into::<TouchEvent>() else {
                        return;
                    };
                    event.prevent_default();
                    let mut overlay = overlay.borrow_mut();
                    overlay.game.arbiter.touch_start();
                    if let Some(touch) = event.touches().get(0) {
                        let pos = field_pos(
                            &canvas_ref,
                            touch.client_x().into(),
                            touch.client_y().into(),
                        );
                        overlay.game.arbiter.touch_moved(pos);
                    }
                },
            )?);
        }

        {
            let overlay = Rc::clone(overlay);
            let canvas_ref = canvas.clone();
            guards.push(ListenerGuard::listen(
                canvas,
                "touchmove",
                move |event: web_sys::Event| {
                    let Ok(event) = event.dyn_into::<TouchEvent>() else {
                        return;
                    };
                    event.prevent_default();
                    if let Some(touch) = event.touches().get(0) {
                        let pos = field_pos(
                            &canvas_ref,
                            touch.client_x().into(),
                            touch.client_y().into(),
                        );
                        overlay.borrow_mut().game.arbiter.touch_moved(pos);
                    }
                },
            )?);
        }

        {
            let overlay = Rc::clone(overlay);
            guards.push(ListenerGuard::listen(canvas, "touchend", move |_| {
                overlay.borrow_mut().game.arbiter.touch_end();
            })?);
        }

        {
            let overlay = Rc::clone(overlay);
            let close = document
                .get_element_by_id("space-adventure-close")
                .ok_or_else(|| JsValue::from_str("close button missing"))?;
            guards.push(ListenerGuard::listen(&close, "click", move |_| {
                overlay.borrow_mut().request_close();
            })?);
        }

        // Clicking the dimmed backdrop (not the play field) also closes
        {
            let overlay = Rc::clone(overlay);
            let root_ref = root.clone();
            guards.push(ListenerGuard::listen(
                root,
                "click",
                move |event: web_sys::Event| {
                    let on_backdrop = event
                        .target()
                        .and_then(|t| t.dyn_into::<HtmlElement>().ok())
                        .is_some_and(|el| el == root_ref);
                    if on_backdrop {
                        overlay.borrow_mut().request_close();
                    }
                },
            )?);
        }

        {
            let canvas_ref = canvas.clone();
            guards.push(ListenerGuard::listen(window, "resize", move |_| {
                resize_canvas(&canvas_ref);
            })?);
        }

        Ok(guards)
    }

    fn resize_canvas(canvas: &HtmlCanvasElement) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let inner_w = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(800.0);
        let inner_h = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(600.0);
        let side = (inner_w.min(inner_h) * 0.9).max(240.0);
        let dpr = window.device_pixel_ratio();
        canvas.set_width((side * dpr) as u32);
        canvas.set_height((side * dpr) as u32);
        let style = canvas.style();
        let _ = style.set_property("width", &format!("{side}px"));
        let _ = style.set_property("height", &format!("{side}px"));
    }

    fn start_frame_loop(
        overlay: &Rc<RefCell<Overlay>>,
        root: &HtmlElement,
        canvas: &HtmlCanvasElement,
        ctx: &CanvasRenderingContext2d,
        raf_id: &Rc<Cell<Option<i32>>>,
    ) -> RafSlot {
        let slot: RafSlot = Rc::new(RefCell::new(None));

        let frame = {
            let overlay = Rc::clone(overlay);
            let root = root.clone();
            let canvas = canvas.clone();
            let ctx = ctx.clone();
            let raf_id = Rc::clone(raf_id);
            let slot = Rc::clone(&slot);
            Closure::<dyn FnMut(f64)>::new(move |_time: f64| {
                let alive = {
                    let mut overlay = overlay.borrow_mut();
                    let alive = overlay.frame(now_ms());
                    if alive {
                        draw(&ctx, &canvas, &overlay.game.state);
                    }
                    alive
                };
                if alive {
                    rearm(&slot, &raf_id);
                } else {
                    raf_id.set(None);
                    root.remove();
                    // Break the closure's self-reference outside this call
                    let slot = Rc::clone(&slot);
                    defer(move || {
                        slot.borrow_mut().take();
                    });
                }
            })
        };

        *slot.borrow_mut() = Some(frame);
        rearm(&slot, raf_id);
        slot
    }

    fn rearm(slot: &RafSlot, raf_id: &Rc<Cell<Option<i32>>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Some(frame) = slot.borrow().as_ref() {
            match window.request_animation_frame(frame.as_ref().unchecked_ref()) {
                Ok(id) => raf_id.set(Some(id)),
                Err(e) => log::error!("failed to schedule frame: {e:?}"),
            }
        }
    }

    fn draw(ctx: &CanvasRenderingContext2d, canvas: &HtmlCanvasElement, state: &crate::sim::state::GameState) {
        let w = canvas.width() as f64;
        let scale = w / FIELD_SIZE as f64;

        ctx.set_global_alpha(1.0);
        ctx.set_fill_style_str("#040612");
        ctx.fill_rect(0.0, 0.0, w, w);

        ctx.save();
        if state.shake > 0.01 {
            let amplitude = state.shake as f64 * 6.0;
            let t = now_ms() / 23.0;
            let _ = ctx.translate(t.sin() * amplitude, (t * 1.7).cos() * amplitude);
        }

        for drop in &state.drops {
            let x = drop.pos.x as f64 * scale;
            let y = drop.pos.y as f64 * scale;
            ctx.set_fill_style_str(drop.kind.particle_color());
            match drop.kind {
                DropKind::Star => {
                    ctx.fill_rect(x, y, scale, scale);
                }
                _ => {
                    let r = drop.kind.spawn_width() as f64 / 2.0 * scale;
                    ctx.begin_path();
                    let _ = ctx.arc(x + r, y + r, r, 0.0, std::f64::consts::TAU);
                    ctx.fill();
                }
            }
        }

        ctx.set_fill_style_str("#93c5fd");
        for bullet in &state.bullets {
            let x = bullet.pos.x as f64 * scale;
            let y = bullet.pos.y as f64 * scale;
            ctx.fill_rect(x, y, scale, 2.0 * scale);
        }

        for particle in &state.particles {
            ctx.set_global_alpha((particle.life as f64).clamp(0.0, 1.0));
            ctx.set_fill_style_str(particle.color);
            let x = particle.pos.x as f64 * scale;
            let y = particle.pos.y as f64 * scale;
            ctx.fill_rect(x, y, scale * 0.8, scale * 0.8);
        }
        ctx.set_global_alpha(1.0);

        // Player ship, banked by its horizontal motion
        let half = PLAYER_SIZE as f64 / 2.0 * scale;
        let center = state.player.center();
        ctx.save();
        let _ = ctx.translate(center.x as f64 * scale, center.y as f64 * scale);
        let _ = ctx.rotate((state.player.rotation as f64).to_radians());
        ctx.set_fill_style_str("#60a5fa");
        ctx.begin_path();
        ctx.move_to(0.0, -half);
        ctx.line_to(half, half);
        ctx.line_to(-half, half);
        ctx.close_path();
        ctx.fill();
        if state.effects.shield_active() {
            ctx.set_stroke_style_str("#34d399");
            ctx.begin_path();
            let _ = ctx.arc(0.0, 0.0, half * 1.8, 0.0, std::f64::consts::TAU);
            ctx.stroke();
        }
        ctx.restore();

        ctx.restore();

        ctx.set_fill_style_str("#e2e8f0");
        ctx.set_font(&format!("{}px monospace", (scale * 4.0) as u32));
        let hud = format!(
            "score {}  best {}  lives {}  level {}",
            state.score, state.best_score, state.lives, state.level
        );
        let _ = ctx.fill_text(&hud, scale * 2.0, scale * 5.0);

        if state.phase == GamePhase::GameOver {
            ctx.set_fill_style_str("#f87171");
            ctx.set_font(&format!("{}px monospace", (scale * 7.0) as u32));
            let _ = ctx.fill_text("GAME OVER", scale * 30.0, scale * 46.0);
            ctx.set_fill_style_str("#e2e8f0");
            ctx.set_font(&format!("{}px monospace", (scale * 3.5) as u32));
            let _ = ctx.fill_text("press Enter to fly again", scale * 32.0, scale * 54.0);
        }
    }

}

//! Scroll-triggered reveal timing
//!
//! Elements tagged `data-reveal` stay hidden until they enter the viewport,
//! wait out a per-element delay, then get the `revealed` class and keep it.
//! The timing lives in [`Reveal`], a plain state machine; the observer
//! wiring is wasm-only.

/// Where an element is in its reveal lifecycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RevealPhase {
    /// Not yet seen in the viewport
    Hidden,
    /// Visible, waiting out the delay
    Pending { since_ms: f64 },
    /// Transition class applied. Terminal.
    Shown,
}

/// Delay gate for one element
#[derive(Debug, Clone)]
pub struct Reveal {
    delay_ms: f64,
    phase: RevealPhase,
}

impl Reveal {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms: delay_ms.max(0.0),
            phase: RevealPhase::Hidden,
        }
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn is_shown(&self) -> bool {
        self.phase == RevealPhase::Shown
    }

    /// Feed a visibility change from the observer. Leaving the viewport
    /// before the delay elapses cancels the pending reveal; once shown,
    /// visibility changes are ignored.
    pub fn on_visibility(&mut self, visible: bool, now_ms: f64) {
        self.phase = match (self.phase, visible) {
            (RevealPhase::Hidden, true) => RevealPhase::Pending { since_ms: now_ms },
            (RevealPhase::Pending { .. }, false) => RevealPhase::Hidden,
            (phase, _) => phase,
        };
    }

    /// Advance the delay timer. Returns true on the frame the element
    /// becomes shown.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        if let RevealPhase::Pending { since_ms } = self.phase
            && now_ms - since_ms >= self.delay_ms
        {
            self.phase = RevealPhase::Shown;
            return true;
        }
        false
    }
}

#[cfg(target_arch = "wasm32")]
pub use dom::RevealObserver;

#[cfg(target_arch = "wasm32")]
mod dom {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;
    use web_sys::{Document, Element, IntersectionObserver, IntersectionObserverEntry};

    use super::Reveal;

    const REVEALED_CLASS: &str = "revealed";
    const DELAY_ATTR: &str = "data-reveal-delay";

    fn now_ms() -> f64 {
        js_sys::Date::now()
    }

    type Gates = Rc<RefCell<HashMap<String, (Element, Reveal)>>>;

    /// Observes every `[data-reveal]` element on the page and applies the
    /// transition class after each element's delay. Dropping the observer
    /// disconnects it and cancels any pending reveals.
    pub struct RevealObserver {
        observer: IntersectionObserver,
        // Kept alive for the lifetime of the observer
        _callback: Closure<dyn FnMut(js_sys::Array)>,
    }

    impl RevealObserver {
        pub fn attach(document: &Document) -> Result<Self, wasm_bindgen::JsValue> {
            let gates: Gates = Rc::new(RefCell::new(HashMap::new()));

            let elements = document.query_selector_all("[data-reveal]")?;
            for i in 0..elements.length() {
                let Some(element) = elements.get(i).and_then(|n| n.dyn_into::<Element>().ok())
                else {
                    continue;
                };
                let delay = element
                    .get_attribute(DELAY_ATTR)
                    .and_then(|v| v.parse::<f64>().ok())
                    .unwrap_or(0.0);
                let key = format!("reveal-{i}");
                element.set_attribute("data-reveal-key", &key)?;
                gates
                    .borrow_mut()
                    .insert(key, (element, Reveal::new(delay)));
            }
            log::debug!("observing {} reveal elements", gates.borrow().len());

            let callback = {
                let gates = Rc::clone(&gates);
                Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
                    let now = now_ms();
                    for entry in entries.iter() {
                        let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                            continue;
                        };
                        let Some(key) = entry.target().get_attribute("data-reveal-key") else {
                            continue;
                        };
                        let became_pending = {
                            let mut gates = gates.borrow_mut();
                            match gates.get_mut(&key) {
                                Some((_, gate)) => {
                                    let was_hidden =
                                        gate.phase() == super::RevealPhase::Hidden;
                                    gate.on_visibility(entry.is_intersecting(), now);
                                    was_hidden
                                        && matches!(
                                            gate.phase(),
                                            super::RevealPhase::Pending { .. }
                                        )
                                }
                                None => false,
                            }
                        };
                        if became_pending {
                            arm_timer(Rc::clone(&gates), key);
                        }
                    }
                })
            };

            let observer = IntersectionObserver::new(callback.as_ref().unchecked_ref())?;
            for (element, _) in gates.borrow().values() {
                observer.observe(element);
            }

            Ok(Self {
                observer,
                _callback: callback,
            })
        }
    }

    impl Drop for RevealObserver {
        fn drop(&mut self) {
            self.observer.disconnect();
        }
    }

    /// One-shot timeout that re-checks the shared gate when it fires, so a
    /// gate that went back to hidden in the meantime stays hidden.
    fn arm_timer(gates: Gates, key: String) {
        let delay = {
            let gates = gates.borrow();
            match gates.get(&key).map(|(_, gate)| gate.delay_ms) {
                Some(delay) => delay.ceil() as i32,
                None => return,
            }
        };
        // Ownership passes to the JS side, which frees the closure after
        // the single call.
        let fire = Closure::once_into_js(move || {
            let mut gates = gates.borrow_mut();
            if let Some((element, gate)) = gates.get_mut(&key)
                && gate.poll(now_ms())
            {
                let _ = element.class_list().add_1(REVEALED_CLASS);
            }
        });
        if let Some(window) = web_sys::window() {
            let _ = window
                .set_timeout_with_callback_and_timeout_and_arguments_0(fire.unchecked_ref(), delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_hidden_until_visible() {
        let mut gate = Reveal::new(100.0);
        assert!(!gate.poll(1_000.0));
        assert_eq!(gate.phase(), RevealPhase::Hidden);
    }

    #[test]
    fn shows_after_delay_elapses() {
        let mut gate = Reveal::new(100.0);
        gate.on_visibility(true, 0.0);
        assert!(!gate.poll(50.0));
        assert!(gate.poll(100.0));
        assert!(gate.is_shown());
    }

    #[test]
    fn zero_delay_shows_on_first_poll() {
        let mut gate = Reveal::new(0.0);
        gate.on_visibility(true, 10.0);
        assert!(gate.poll(10.0));
    }

    #[test]
    fn leaving_viewport_cancels_pending_reveal() {
        let mut gate = Reveal::new(100.0);
        gate.on_visibility(true, 0.0);
        gate.on_visibility(false, 40.0);
        assert!(!gate.poll(200.0));
        assert_eq!(gate.phase(), RevealPhase::Hidden);

        // Coming back restarts the delay from scratch
        gate.on_visibility(true, 300.0);
        assert!(!gate.poll(350.0));
        assert!(gate.poll(400.0));
    }

    #[test]
    fn shown_is_terminal() {
        let mut gate = Reveal::new(0.0);
        gate.on_visibility(true, 0.0);
        assert!(gate.poll(0.0));
        gate.on_visibility(false, 10.0);
        assert!(gate.is_shown());
        // poll reports the transition only once
        assert!(!gate.poll(20.0));
    }

    #[test]
    fn negative_delay_is_clamped() {
        let mut gate = Reveal::new(-50.0);
        gate.on_visibility(true, 5.0);
        assert!(gate.poll(5.0));
    }
}

//! Site entry point
//!
//! On wasm this hydrates the marketing pages: CMS-backed sections render
//! skeletons first and fill in when the fetch resolves, reveal-on-scroll
//! elements get their observer, the contact form gets its submit handler,
//! and the flying rocket icon mounts the Space Adventure overlay.
//!
//! The native build runs a short headless simulation as a smoke check.

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{Document, Element, HtmlInputElement, HtmlTextAreaElement};

    use steadfast_haven::contact::{ContactForm, FormState, HttpEmailEndpoint, SubmitStatus};
    use steadfast_haven::content::{ContentClient, or_empty, render};
    use steadfast_haven::overlay::OverlayHandle;
    use steadfast_haven::reveal::RevealObserver;
    use steadfast_haven::{SiteConfig, config};

    pub async fn run() {
        log::info!("site core starting");

        let Some(window) = web_sys::window() else {
            log::error!("no window object");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("no document");
            return;
        };

        config::init(SiteConfig::default());

        match RevealObserver::attach(&document) {
            // Observers live for the whole page; leak them deliberately
            Ok(observer) => std::mem::forget(observer),
            Err(e) => log::error!("reveal observer failed to attach: {e:?}"),
        }

        setup_game_launch(&document);
        setup_contact_form(&document);
        hydrate_content(&document).await;

        log::info!("site core ready");
    }

    /// Replace CMS-backed skeleton sections once the collections arrive.
    /// Empty or failed fetches render the "no items" placeholder.
    async fn hydrate_content(document: &Document) {
        let client = ContentClient::new();

        if let Some(grid) = document.get_element_by_id("team-grid") {
            let members = or_empty(client.team_members().await, "team members");
            grid.set_inner_html(&render::team_members_html(&members));
        }

        if let Some(list) = document.get_element_by_id("events-list") {
            let events = or_empty(client.events().await, "events");
            list.set_inner_html(&render::events_html(&events));
        }

        if let Some(grid) = document.get_element_by_id("projects-grid") {
            let projects = or_empty(client.projects().await, "projects");
            grid.set_inner_html(&render::projects_html(&projects));
        }

        if let Some(row) = document.get_element_by_id("home-cards") {
            let cards = or_empty(client.home_cards().await, "home cards");
            row.set_inner_html(&render::home_cards_html(&cards));
        }
    }

    /// Click on the flying rocket mounts the overlay; closing it drops the
    /// handle, which cancels the frame loop and removes every listener.
    fn setup_game_launch(document: &Document) {
        let Some(launcher) = document.get_element_by_id("game-launch") else {
            return;
        };
        let slot: Rc<RefCell<Option<OverlayHandle>>> = Rc::new(RefCell::new(None));

        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |_| {
            if slot.borrow().is_some() {
                return;
            }
            let slot_for_close = Rc::clone(&slot);
            match OverlayHandle::mount(move || {
                slot_for_close.borrow_mut().take();
                log::debug!("game overlay unmounted");
            }) {
                Ok(handle) => *slot.borrow_mut() = Some(handle),
                Err(e) => log::error!("failed to mount game overlay: {e:?}"),
            }
        });
        let _ = launcher.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn input_value(document: &Document, id: &str) -> String {
        document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|el| el.value())
            .unwrap_or_default()
    }

    fn textarea_value(document: &Document, id: &str) -> String {
        document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlTextAreaElement>().ok())
            .map(|el| el.value())
            .unwrap_or_default()
    }

    fn set_status(status_el: &Option<Element>, class: &str, text: &str) {
        if let Some(el) = status_el {
            let _ = el.set_attribute("class", class);
            el.set_text_content(Some(text));
        }
    }

    fn setup_contact_form(document: &Document) {
        let Some(form) = document.get_element_by_id("contact-form") else {
            return;
        };
        let document = document.clone();

        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            event.prevent_default();
            let document = document.clone();
            spawn_local(async move {
                let status_el = document.get_element_by_id("form-status");
                let mut state = FormState::new();
                state.fields = ContactForm {
                    name: input_value(&document, "contact-name"),
                    last_name: input_value(&document, "contact-last-name"),
                    email: input_value(&document, "contact-email"),
                    message: textarea_value(&document, "contact-message"),
                };
                set_status(&status_el, "form-status sending", "Sending\u{2026}");

                state.submit(&HttpEmailEndpoint::new()).await;

                match &state.status {
                    SubmitStatus::Success(text) => {
                        set_status(&status_el, "form-status success", text);
                        for id in ["contact-name", "contact-last-name", "contact-email"] {
                            if let Some(el) = document
                                .get_element_by_id(id)
                                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                            {
                                el.set_value("");
                            }
                        }
                        if let Some(el) = document
                            .get_element_by_id("contact-message")
                            .and_then(|el| el.dyn_into::<HtmlTextAreaElement>().ok())
                        {
                            el.set_value("");
                        }
                    }
                    SubmitStatus::Error(text) => {
                        set_status(&status_el, "form-status error", text);
                    }
                    _ => {}
                }
            });
        });
        let _ = form.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    wasm_bindgen_futures::spawn_local(web::run());
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use steadfast_haven::consts::NOMINAL_FRAME_MS;
    use steadfast_haven::overlay::Game;
    use steadfast_haven::sim::input::Profile;
    use steadfast_haven::sim::state::GamePhase;

    env_logger::init();

    // Headless smoke run: ten simulated seconds of Space Adventure
    let mut game = Game::new(0xC0FFEE, Profile::Desktop);
    game.start();
    let frames = 10_000.0 / NOMINAL_FRAME_MS;
    let mut now = 0.0;
    for _ in 0..frames as u32 {
        game.frame(now);
        now += NOMINAL_FRAME_MS;
        if game.state.phase == GamePhase::GameOver {
            break;
        }
    }
    log::info!(
        "headless run finished: score {}, level {}, {} drops live, phase {:?}",
        game.state.score,
        game.state.level,
        game.state.drops.len(),
        game.state.phase
    );
    println!(
        "space-adventure smoke run: score {} level {} ({:?})",
        game.state.score, game.state.level, game.state.phase
    );
}

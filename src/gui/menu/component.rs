use crate::anim::{Immediate, Tween, TweenSpec};
use crate::config::{MenuAction, MenuSettings};
use crate::dom::{Element, EventKind, ListenerId};
use crate::gui::menu::model::{CachedStyle, HoverCache, Layout, MenuState, Point, Target};
use crate::gui::menu::{
    ACTION_CLASS, HOVER_CLASS, MODAL_CLASS, MODAL_CLOSE_CLASS, OPEN_CLASS, PANEL_CLASS,
    ROOT_CLASS, TOGGLE_CLASS,
};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;
use thiserror::Error;

pub type Callback = Rc<dyn Fn()>;

pub trait VrIntegration {
    fn toggle_vr(&self);
}

const VOID_TAGS: &[&str] = &["button", "img", "input", "br", "hr"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MenuError {
    #[error("A container element is required to mount the menu")]
    MissingContainer,
    #[error("Cannot mount the menu inside <{0}>")]
    InvalidContainer(String),
    #[error("Container {0} already hosts a circular menu")]
    AlreadyMounted(String),
}

#[derive(Default)]
pub struct MenuOptions {
    pub container: Option<Element>,
    pub vr_integration: Option<Rc<dyn VrIntegration>>,
    pub on_audio_toggle: Option<Callback>,
    pub on_walk_mode: Option<Callback>,
    pub on_fullscreen: Option<Callback>,
    pub tween: Option<Rc<dyn Tween>>,
    pub settings: MenuSettings,
}

impl MenuOptions {
    pub fn new(container: &Element) -> Self {
        Self {
            container: Some(container.clone()),
            ..Self::default()
        }
    }

    pub fn vr_integration(mut self, vr: impl VrIntegration + 'static) -> Self {
        self.vr_integration = Some(Rc::new(vr));
        self
    }

    pub fn on_audio_toggle(mut self, f: impl Fn() + 'static) -> Self {
        self.on_audio_toggle = Some(Rc::new(f));
        self
    }

    pub fn on_walk_mode(mut self, f: impl Fn() + 'static) -> Self {
        self.on_walk_mode = Some(Rc::new(f));
        self
    }

    pub fn on_fullscreen(mut self, f: impl Fn() + 'static) -> Self {
        self.on_fullscreen = Some(Rc::new(f));
        self
    }

    pub fn tween(mut self, tween: impl Tween + 'static) -> Self {
        self.tween = Some(Rc::new(tween));
        self
    }

    pub fn settings(mut self, settings: MenuSettings) -> Self {
        self.settings = settings;
        self
    }
}

struct Handlers {
    audio: Option<Callback>,
    walk: Option<Callback>,
    fullscreen: Option<Callback>,
    vr: Option<Rc<dyn VrIntegration>>,
}

impl Handlers {
    fn invoke(&self, action: MenuAction) -> bool {
        let callback = match action {
            MenuAction::Audio => &self.audio,
            MenuAction::Walk => &self.walk,
            MenuAction::Fullscreen => &self.fullscreen,
            MenuAction::Vr => {
                let Some(vr) = &self.vr else {
                    return false;
                };
                vr.toggle_vr();
                return true;
            }
            MenuAction::About => return false,
        };
        match callback {
            Some(f) => {
                f();
                true
            }
            None => false,
        }
    }
}

struct Inner {
    me: Weak<Inner>,
    container: Element,
    root: Element,
    toggle: Element,
    panel: Element,
    actions: Vec<(MenuAction, Element)>,
    modal: RefCell<Option<Element>>,
    state: RefCell<MenuState>,
    hover: RefCell<HoverCache>,
    registrations: RefCell<Vec<(Element, ListenerId)>>,
    handlers: Handlers,
    tween: Rc<dyn Tween>,
    settings: MenuSettings,
}

pub struct CircularMenu {
    inner: Rc<Inner>,
}

impl fmt::Debug for CircularMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircularMenu")
            .field("container", &self.inner.container)
            .field("is_open", &self.is_open())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

fn validate_container(options: &MenuOptions) -> Result<Element, MenuError> {
    let container = options
        .container
        .clone()
        .ok_or(MenuError::MissingContainer)?;

    let tag = container.tag();
    if VOID_TAGS.contains(&tag.as_str()) {
        return Err(MenuError::InvalidContainer(tag));
    }
    if container.children().iter().any(|c| c.has_class(ROOT_CLASS)) {
        return Err(MenuError::AlreadyMounted(format!("{:?}", container)));
    }
    Ok(container)
}

fn dedup_actions(actions: &[MenuAction]) -> Vec<MenuAction> {
    let mut out: Vec<MenuAction> = Vec::with_capacity(actions.len());
    for action in actions {
        if out.contains(action) {
            log::warn!("Ignoring duplicate '{}' menu action", action);
            continue;
        }
        out.push(*action);
    }
    out
}

fn action_button(action: MenuAction, settings: &MenuSettings) -> Element {
    Element::create("button")
        .with_class(ACTION_CLASS)
        .with_attr("type", "button")
        .with_attr("role", "menuitem")
        .with_attr("data-action", action.to_string())
        .with_attr("aria-label", action.label())
        .with_attr("title", action.label())
        .with_style("background", settings.background.clone())
        .with_style("transform", "scale(1)")
        .with_text(action.glyph())
}

fn toggle_label(settings: &MenuSettings) -> String {
    if settings.toggle_label.trim().is_empty() {
        MenuSettings::default().toggle_label
    } else {
        settings.toggle_label.clone()
    }
}

fn restore_style(el: &Element, name: &str, value: Option<String>) {
    match value {
        Some(v) => el.set_style(name, v),
        None => el.remove_style(name),
    }
}

impl CircularMenu {
    pub fn new(options: MenuOptions) -> Result<Self, MenuError> {
        let container = validate_container(&options)?;
        let settings = options.settings;

        let root = Element::create("div").with_class(ROOT_CLASS);
        let toggle = Element::create("button")
            .with_class(TOGGLE_CLASS)
            .with_attr("type", "button")
            .with_attr("aria-label", toggle_label(&settings))
            .with_attr("aria-haspopup", "menu")
            .with_attr("aria-expanded", "false")
            .with_text(settings.toggle_glyph.clone());
        let panel = Element::create("div")
            .with_class(PANEL_CLASS)
            .with_attr("role", "menu")
            .with_attr("hidden", "")
            .with_style("opacity", "0")
            .with_style("transform", format!("translateY({}px)", settings.offset_y));

        let actions: Vec<(MenuAction, Element)> = dedup_actions(&settings.actions)
            .into_iter()
            .map(|action| (action, action_button(action, &settings)))
            .collect();
        for (_, button) in &actions {
            panel.append_child(button);
        }

        root.append_child(&toggle);
        root.append_child(&panel);
        container.append_child(&root);

        let handlers = Handlers {
            audio: options.on_audio_toggle,
            walk: options.on_walk_mode,
            fullscreen: options.on_fullscreen,
            vr: options.vr_integration,
        };
        let tween = options.tween.unwrap_or_else(|| Rc::new(Immediate));

        let inner = Rc::new_cyclic(|me| Inner {
            me: me.clone(),
            container,
            root,
            toggle,
            panel,
            actions,
            modal: RefCell::new(None),
            state: RefCell::new(MenuState::default()),
            hover: RefCell::new(HoverCache::default()),
            registrations: RefCell::new(Vec::new()),
            handlers,
            tween,
            settings,
        });
        inner.wire();

        log::debug!(
            "Circular menu mounted in {:?} with {} actions",
            inner.container,
            inner.actions.len()
        );
        Ok(Self { inner })
    }

    pub fn is_open(&self) -> bool {
        self.inner.state.borrow().is_open()
    }

    pub fn is_destroyed(&self) -> bool {
        !self.inner.is_alive()
    }

    pub fn is_about_open(&self) -> bool {
        self.inner.modal.borrow().is_some()
    }

    pub fn is_panel_visible(&self) -> bool {
        self.inner.is_alive() && !self.inner.panel.has_attr("hidden")
    }

    pub fn settings(&self) -> &MenuSettings {
        &self.inner.settings
    }

    pub fn actions(&self) -> Vec<MenuAction> {
        self.inner.actions.iter().map(|(a, _)| *a).collect()
    }

    pub fn container(&self) -> &Element {
        &self.inner.container
    }

    pub fn root(&self) -> &Element {
        &self.inner.root
    }

    pub fn toggle_button(&self) -> &Element {
        &self.inner.toggle
    }

    pub fn panel(&self) -> &Element {
        &self.inner.panel
    }

    pub fn action_button(&self, action: MenuAction) -> Option<&Element> {
        self.inner
            .actions
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, el)| el)
    }

    pub fn action_buttons(&self) -> Vec<Element> {
        self.inner.actions.iter().map(|(_, el)| el.clone()).collect()
    }

    pub fn modal(&self) -> Option<Element> {
        self.inner.modal.borrow().clone()
    }

    pub fn toggle_menu(&self) {
        self.inner.toggle_menu();
    }

    pub fn activate(&self, action: MenuAction) {
        if self.inner.is_alive() {
            self.inner.activate(action);
        }
    }

    pub fn open_about(&self) {
        self.inner.open_about();
    }

    pub fn close_about(&self) {
        self.inner.close_about();
    }

    pub fn target_at(&self, layout: &Layout, p: Point) -> Option<Element> {
        if !self.inner.is_alive() {
            return None;
        }
        let modal = self.modal();
        match layout.hit_test(p, self.is_open(), modal.is_some())? {
            Target::Toggle => Some(self.inner.toggle.clone()),
            Target::Action(i) => self.inner.actions.get(i).map(|(_, el)| el.clone()),
            Target::Modal => modal,
            Target::ModalClose => modal.and_then(|m| {
                m.children()
                    .into_iter()
                    .find(|c| c.has_class(MODAL_CLOSE_CLASS))
            }),
        }
    }

    /// Removes every node and listener the menu created. Idempotent.
    pub fn destroy(&self) {
        if !self.inner.state.borrow_mut().destroy() {
            log::debug!("Circular menu already destroyed");
            return;
        }

        let registrations = std::mem::take(&mut *self.inner.registrations.borrow_mut());
        for (el, id) in &registrations {
            el.remove_listener(*id);
        }
        if let Some(modal) = self.inner.modal.borrow_mut().take() {
            modal.remove();
        }
        self.inner.root.remove();

        log::debug!(
            "Circular menu destroyed, {} listeners removed",
            registrations.len()
        );
    }
}

impl Drop for CircularMenu {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl Inner {
    fn is_alive(&self) -> bool {
        self.state.borrow().is_alive()
    }

    fn duration(&self) -> Duration {
        Duration::from_millis(self.settings.animation_ms)
    }

    fn listen(&self, el: &Element, kind: EventKind, f: impl Fn(&Inner) + 'static) {
        let me = self.me.clone();
        let id = el.add_listener(kind, move |_| {
            let Some(inner) = me.upgrade() else {
                return;
            };
            if inner.is_alive() {
                f(&inner);
            }
        });
        self.registrations.borrow_mut().push((el.clone(), id));
    }

    fn wire(&self) {
        self.listen(&self.toggle, EventKind::Click, Inner::toggle_menu);

        for (index, (action, button)) in self.actions.iter().enumerate() {
            let action = *action;
            self.listen(button, EventKind::Click, move |inner| inner.activate(action));
            self.listen(button, EventKind::PointerEnter, move |inner| {
                inner.hover_enter(index)
            });
            self.listen(button, EventKind::PointerLeave, move |inner| {
                inner.hover_leave(index)
            });
        }
    }

    fn toggle_menu(&self) {
        let Some(open) = self.state.borrow_mut().toggle() else {
            log::debug!("Ignoring toggle on a destroyed menu");
            return;
        };
        let generation = self.state.borrow().generation();

        self.toggle.set_attr("aria-expanded", open.to_string());
        let spec = TweenSpec::new(self.duration());

        if open {
            self.root.add_class(OPEN_CLASS);
            self.panel.remove_attr("hidden");
            self.tween.to(&self.panel, spec.opacity(1.0).y(0.0));
        } else {
            self.root.remove_class(OPEN_CLASS);
            let me = self.me.clone();
            self.tween.to(
                &self.panel,
                spec.opacity(0.0)
                    .y(self.settings.offset_y)
                    .on_complete(move || {
                        if let Some(inner) = me.upgrade() {
                            inner.finish_close(generation);
                        }
                    }),
            );
        }

        log::debug!("Menu {}", if open { "opened" } else { "closed" });
    }

    fn finish_close(&self, generation: u64) {
        let current = {
            let state = self.state.borrow();
            state.is_alive() && !state.is_open() && state.generation() == generation
        };
        if current {
            self.panel.set_attr("hidden", "");
        }
    }

    fn activate(&self, action: MenuAction) {
        log::info!("Menu action: {}", action);
        if action == MenuAction::About {
            self.open_about();
        } else if !self.handlers.invoke(action) {
            log::debug!("No handler registered for '{}'", action);
        }
    }

    fn hover_enter(&self, index: usize) {
        let Some((_, button)) = self.actions.get(index) else {
            return;
        };
        let cached = CachedStyle {
            background: button.style("background"),
            transform: button.style("transform"),
        };
        if !self.hover.borrow_mut().enter(index, cached) {
            return;
        }

        button.add_class(HOVER_CLASS);
        button.set_style("background", self.settings.highlight.clone());
        button.set_style(
            "transform",
            format!("scale({})", self.settings.highlight_scale),
        );
    }

    fn hover_leave(&self, index: usize) {
        let Some((_, button)) = self.actions.get(index) else {
            return;
        };
        let Some(cached) = self.hover.borrow_mut().leave(index) else {
            return;
        };

        button.remove_class(HOVER_CLASS);
        restore_style(button, "background", cached.background);
        restore_style(button, "transform", cached.transform);
    }

    fn open_about(&self) {
        if !self.is_alive() || self.modal.borrow().is_some() {
            return;
        }

        let about = &self.settings.about;
        let modal = Element::create("div")
            .with_class(MODAL_CLASS)
            .with_attr("role", "dialog")
            .with_attr("aria-modal", "true")
            .with_attr("aria-label", about.title.clone());
        let close = Element::create("button")
            .with_class(MODAL_CLOSE_CLASS)
            .with_attr("type", "button")
            .with_attr("aria-label", about.close_label.clone())
            .with_text(about.close_label.clone());

        modal.append_child(&Element::create("h2").with_text(about.title.clone()));
        modal.append_child(
            &Element::create("p")
                .with_class("modal-body")
                .with_text(about.body.clone()),
        );
        modal.append_child(
            &Element::create("p")
                .with_class("modal-attribution")
                .with_text(about.attribution.clone()),
        );
        modal.append_child(&close);

        self.container.append_child(&modal);
        self.listen(&close, EventKind::Click, Inner::close_about);
        *self.modal.borrow_mut() = Some(modal);

        log::debug!("About card opened");
    }

    fn close_about(&self) {
        let Some(modal) = self.modal.borrow_mut().take() else {
            return;
        };

        self.registrations.borrow_mut().retain(|(el, id)| {
            if modal.contains(el) {
                el.remove_listener(*id);
                false
            } else {
                true
            }
        });
        modal.remove();

        log::debug!("About card closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, impl Fn() + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, move || c.set(c.get() + 1))
    }

    fn mount(container: &Element) -> CircularMenu {
        CircularMenu::new(MenuOptions::new(container)).unwrap()
    }

    #[test]
    fn test_missing_container() {
        let err = CircularMenu::new(MenuOptions::default()).unwrap_err();
        assert_eq!(err, MenuError::MissingContainer);
    }

    #[test]
    fn test_void_container() {
        let err = CircularMenu::new(MenuOptions::new(&Element::create("button"))).unwrap_err();
        assert_eq!(err, MenuError::InvalidContainer("button".into()));
    }

    #[test]
    fn test_second_menu_in_same_container() {
        let container = Element::create("div");
        let _first = mount(&container);
        let err = CircularMenu::new(MenuOptions::new(&container)).unwrap_err();
        assert!(matches!(err, MenuError::AlreadyMounted(_)));
    }

    #[test]
    fn test_remount_after_destroy() {
        let container = Element::create("div");
        mount(&container).destroy();
        assert!(CircularMenu::new(MenuOptions::new(&container)).is_ok());
    }

    #[test]
    fn test_duplicate_actions_collapse() {
        let container = Element::create("div");
        let settings = MenuSettings {
            actions: vec![MenuAction::Audio, MenuAction::Audio, MenuAction::About],
            ..MenuSettings::default()
        };
        let menu = CircularMenu::new(MenuOptions::new(&container).settings(settings)).unwrap();
        assert_eq!(menu.actions(), vec![MenuAction::Audio, MenuAction::About]);
    }

    #[test]
    fn test_blank_toggle_label_falls_back() {
        let container = Element::create("div");
        let settings = MenuSettings {
            toggle_label: "  ".into(),
            ..MenuSettings::default()
        };
        let menu = CircularMenu::new(MenuOptions::new(&container).settings(settings)).unwrap();
        assert_eq!(
            menu.toggle_button().attr("aria-label").as_deref(),
            Some("Toggle menu")
        );
    }

    #[test]
    fn test_aria_expanded_follows_state() {
        let container = Element::create("div");
        let menu = mount(&container);
        let toggle = menu.toggle_button().clone();

        assert_eq!(toggle.attr("aria-expanded").as_deref(), Some("false"));
        toggle.dispatch(EventKind::Click);
        assert_eq!(toggle.attr("aria-expanded").as_deref(), Some("true"));
        assert!(menu.root().has_class(OPEN_CLASS));
        assert!(menu.is_panel_visible());
        assert_eq!(menu.panel().style("opacity").as_deref(), Some("1"));
    }

    #[test]
    fn test_close_hides_panel_after_fade() {
        let container = Element::create("div");
        let menu = mount(&container);

        menu.toggle_menu();
        menu.toggle_menu();

        assert!(!menu.is_panel_visible());
        assert_eq!(menu.panel().style("opacity").as_deref(), Some("0"));
        assert_eq!(
            menu.panel().style("transform").as_deref(),
            Some("translateY(20px)")
        );
    }

    #[test]
    fn test_actions_do_not_touch_open_state() {
        let container = Element::create("div");
        let (walks, on_walk) = counter();
        let (fulls, on_full) = counter();
        let menu = CircularMenu::new(
            MenuOptions::new(&container)
                .on_walk_mode(on_walk)
                .on_fullscreen(on_full),
        )
        .unwrap();

        menu.action_button(MenuAction::Walk)
            .unwrap()
            .dispatch(EventKind::Click);
        menu.action_button(MenuAction::Fullscreen)
            .unwrap()
            .dispatch(EventKind::Click);

        assert_eq!(walks.get(), 1);
        assert_eq!(fulls.get(), 1);
        assert!(!menu.is_open());
    }

    #[test]
    fn test_missing_callbacks_are_noops() {
        let container = Element::create("div");
        let menu = mount(&container);
        for button in menu.action_buttons() {
            button.dispatch(EventKind::Click);
        }
        assert!(!menu.is_open());
        assert!(menu.is_about_open());
    }

    #[test]
    fn test_vr_integration_is_called() {
        struct Vr(Rc<Cell<u32>>);
        impl VrIntegration for Vr {
            fn toggle_vr(&self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let container = Element::create("div");
        let toggles = Rc::new(Cell::new(0));
        let menu =
            CircularMenu::new(MenuOptions::new(&container).vr_integration(Vr(toggles.clone())))
                .unwrap();

        menu.activate(MenuAction::Vr);
        menu.activate(MenuAction::Vr);
        assert_eq!(toggles.get(), 2);
    }

    #[test]
    fn test_about_opens_once() {
        let container = Element::create("div");
        let menu = mount(&container);

        menu.open_about();
        menu.open_about();

        assert_eq!(container.query_selector_all(".modal").unwrap().len(), 1);
        menu.close_about();
        assert!(container.query_selector(".modal").unwrap().is_none());
        assert!(!menu.is_about_open());
    }

    #[test]
    fn test_closing_about_drops_its_listener() {
        let container = Element::create("div");
        let menu = mount(&container);
        let baseline = menu.inner.registrations.borrow().len();

        menu.open_about();
        let close = container.query_selector(".modal-close").unwrap().unwrap();
        assert_eq!(menu.inner.registrations.borrow().len(), baseline + 1);

        close.dispatch(EventKind::Click);
        assert_eq!(close.listener_count(), 0);
        assert_eq!(menu.inner.registrations.borrow().len(), baseline);
    }

    #[test]
    fn test_repeated_enter_keeps_original_style() {
        let container = Element::create("div");
        let menu = mount(&container);
        let button = menu.action_button(MenuAction::Walk).unwrap().clone();
        let before = button.style("background");

        button.dispatch(EventKind::PointerEnter);
        button.dispatch(EventKind::PointerEnter);
        button.dispatch(EventKind::PointerLeave);

        assert_eq!(button.style("background"), before);
        assert_eq!(button.style("transform").as_deref(), Some("scale(1)"));
        assert!(!button.has_class(HOVER_CLASS));
    }

    #[test]
    fn test_leave_without_enter_is_ignored() {
        let container = Element::create("div");
        let menu = mount(&container);
        let button = menu.action_button(MenuAction::Audio).unwrap().clone();
        button.set_style("transform", "rotate(5deg)");

        button.dispatch(EventKind::PointerLeave);
        assert_eq!(button.style("transform").as_deref(), Some("rotate(5deg)"));
    }

    #[test]
    fn test_hover_restores_missing_properties() {
        let container = Element::create("div");
        let menu = mount(&container);
        let button = menu.action_button(MenuAction::Audio).unwrap().clone();
        button.remove_style("background");

        button.dispatch(EventKind::PointerEnter);
        assert!(button.style("background").is_some());
        button.dispatch(EventKind::PointerLeave);
        assert_eq!(button.style("background"), None);
    }

    #[test]
    fn test_target_at_maps_layout_to_elements() {
        let container = Element::create("div");
        let menu = mount(&container);
        let layout = Layout::new(menu.settings(), menu.actions().len(), 1280.0, 720.0);

        assert_eq!(
            menu.target_at(&layout, layout.anchor).as_ref(),
            Some(menu.toggle_button())
        );
        assert_eq!(menu.target_at(&layout, layout.slots[0].center), None);

        menu.toggle_menu();
        assert_eq!(
            menu.target_at(&layout, layout.slots[0].center).as_ref(),
            menu.action_button(MenuAction::Audio)
        );

        menu.open_about();
        let close = menu.target_at(&layout, layout.modal_close.center()).unwrap();
        assert!(close.has_class(MODAL_CLOSE_CLASS));

        menu.destroy();
        assert_eq!(menu.target_at(&layout, layout.anchor), None);
    }

    #[test]
    fn test_drop_destroys() {
        let container = Element::create("div");
        let menu = mount(&container);
        let toggle = menu.toggle_button().clone();
        drop(menu);

        assert!(container.children().is_empty());
        assert_eq!(toggle.listener_count(), 0);
    }
}

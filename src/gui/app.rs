use crate::anim::Timeline;
use crate::config::{self, Config, MenuSettings};
use crate::dom::Element;
use crate::events::AppEvent;
use crate::gui::hud;
use crate::gui::menu::{self, CircularMenu, Layout, MenuOptions, Point, VrIntegration};
use crate::gui::pointer::PointerTracker;
use crate::gui::theme::{self, ThemeColors};
use crate::hud::Hud;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

const POINTS_PER_WALK_SECOND: u32 = 10;
const DEFAULT_SIZE: (i32, i32) = (1280, 720);

pub struct Scene {
    pub document: Element,
    pub menu: Option<CircularMenu>,
    pub hud: Hud,
    pub pointer: PointerTracker,
    pub layout: Layout,
}

impl Scene {
    fn target_at(&self, p: Point) -> Option<Element> {
        self.menu
            .as_ref()
            .and_then(|menu| menu.target_at(&self.layout, p))
    }

    fn relayout(&mut self, width: f64, height: f64) {
        if let Some(menu) = &self.menu {
            self.layout = Layout::new(menu.settings(), menu.actions().len(), width, height);
        }
    }

    fn draw(&self, cr: &cairo::Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        hud::draw(cr, &self.hud, colors, self.layout.scale_factor)?;
        if let Some(menu) = &self.menu {
            menu::draw(cr, menu, &self.layout, colors)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Session {
    pub muted: bool,
    pub walking: bool,
    pub vr_active: bool,
    pub elapsed: u64,
    pub points: u32,
}

pub struct AppModel {
    pub scene: Rc<RefCell<Scene>>,
    pub session: Session,
    pub config: Config,
    pub config_path: PathBuf,
    pub root: gtk::ApplicationWindow,
    pub drawing_area: gtk::DrawingArea,
}

#[derive(Debug, Clone)]
pub enum AppMsg {
    PointerMove(Point),
    PointerLeave,
    Click(Point),
    ToggleMenu,
    CloseAbout,
    AudioToggled,
    WalkModeToggled,
    FullscreenToggled,
    VrToggled,
    Tick,
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

struct VrBridge(ComponentSender<AppModel>);

impl VrIntegration for VrBridge {
    fn toggle_vr(&self) {
        self.0.input(AppMsg::VrToggled);
    }
}

fn forward(sender: &ComponentSender<AppModel>, msg: AppMsg) -> impl Fn() + 'static {
    let sender = sender.clone();
    move || sender.input(msg.clone())
}

fn mount_menu(
    document: &Element,
    settings: &MenuSettings,
    sender: &ComponentSender<AppModel>,
    drawing_area: &gtk::DrawingArea,
) -> Option<CircularMenu> {
    let area = drawing_area.clone();
    let options = MenuOptions::new(document)
        .settings(settings.clone())
        .tween(Timeline::new(move || area.queue_draw()))
        .on_audio_toggle(forward(sender, AppMsg::AudioToggled))
        .on_walk_mode(forward(sender, AppMsg::WalkModeToggled))
        .on_fullscreen(forward(sender, AppMsg::FullscreenToggled))
        .vr_integration(VrBridge(sender.clone()));

    match CircularMenu::new(options) {
        Ok(menu) => Some(menu),
        Err(e) => {
            log::error!("Failed to mount menu: {}", e);
            None
        }
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (Config, PathBuf, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Vista"),
            set_default_size: (DEFAULT_SIZE.0, DEFAULT_SIZE.1),
            add_css_class: "vista-window",

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    if key == gdk4::Key::Escape {
                        sender.input(AppMsg::CloseAbout);
                        return glib::Propagation::Stop;
                    }
                    if key == gdk4::Key::m || key == gdk4::Key::M {
                        sender.input(AppMsg::ToggleMenu);
                        return glib::Propagation::Stop;
                    }
                    glib::Propagation::Proceed
                }
            },

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_vexpand: true,
                add_css_class: "vista-drawing-area",

                add_controller = gtk::EventControllerMotion {
                    connect_motion[sender] => move |_, x, y| {
                        sender.input(AppMsg::PointerMove(Point::new(x, y)));
                    },
                    connect_leave[sender] => move |_| {
                        sender.input(AppMsg::PointerLeave);
                    }
                },

                add_controller = gtk::GestureClick {
                    set_button: gdk4::BUTTON_PRIMARY,
                    connect_released[sender] => move |_, _, x, y| {
                        sender.input(AppMsg::Click(Point::new(x, y)));
                    }
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (config, config_path, rx) = init;

        theme::load_css();

        let document = Element::create("div").with_id("vista-root");
        let hud = Hud::mount(&document, &config.hud);
        let layout = Layout::new(
            &config.menu,
            config.menu.actions.len(),
            DEFAULT_SIZE.0 as f64,
            DEFAULT_SIZE.1 as f64,
        );
        let scene = Scene {
            document,
            menu: None,
            hud,
            pointer: PointerTracker::default(),
            layout,
        };

        let model = AppModel {
            scene: Rc::new(RefCell::new(scene)),
            session: Session::default(),
            config,
            config_path,
            root: root.clone(),
            drawing_area: gtk::DrawingArea::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        {
            let mut scene = model.scene.borrow_mut();
            let menu = mount_menu(
                &scene.document,
                &model.config.menu,
                &sender,
                &model.drawing_area,
            );
            scene.menu = menu;
        }

        let scene_draw = model.scene.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, width, height| {
                let style_context = drawing_area.style_context();
                let colors = ThemeColors::from_context(&style_context);
                let mut scene = scene_draw.borrow_mut();
                scene.relayout(width as f64, height as f64);
                if let Err(e) = scene.draw(cr, &colors) {
                    log::error!("Drawing error: {}", e);
                }
            });

        let tick_sender = sender.clone();
        glib::timeout_add_seconds_local(1, move || {
            tick_sender.input(AppMsg::Tick);
            glib::ControlFlow::Continue
        });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>) {
        match msg {
            AppMsg::PointerMove(point) => {
                let mut scene = self.scene.borrow_mut();
                let target = scene.target_at(point);
                if scene.pointer.update(target) {
                    self.drawing_area.queue_draw();
                }
            }
            AppMsg::PointerLeave => {
                if self.scene.borrow_mut().pointer.reset() {
                    self.drawing_area.queue_draw();
                }
            }
            AppMsg::Click(point) => {
                let mut scene = self.scene.borrow_mut();
                let target = scene.target_at(point);
                scene.pointer.update(target);
                if !scene.pointer.click() {
                    return;
                }
                // the click may have opened, closed or replaced what is under the pointer
                let target = scene.target_at(point);
                scene.pointer.update(target);
                self.drawing_area.queue_draw();
            }
            AppMsg::ToggleMenu => {
                if let Some(menu) = &self.scene.borrow().menu {
                    menu.toggle_menu();
                }
                self.drawing_area.queue_draw();
            }
            AppMsg::CloseAbout => {
                let mut scene = self.scene.borrow_mut();
                let closed = match &scene.menu {
                    Some(menu) if menu.is_about_open() => {
                        menu.close_about();
                        true
                    }
                    _ => false,
                };
                if closed {
                    scene.pointer.reset();
                    self.drawing_area.queue_draw();
                }
            }
            AppMsg::AudioToggled => {
                self.session.muted = !self.session.muted;
                log::info!("Audio {}", on_off(!self.session.muted));
            }
            AppMsg::WalkModeToggled => {
                self.session.walking = !self.session.walking;
                log::info!("Walk mode {}", on_off(self.session.walking));
            }
            AppMsg::FullscreenToggled => {
                if self.root.is_fullscreen() {
                    self.root.unfullscreen();
                } else {
                    self.root.fullscreen();
                }
            }
            AppMsg::VrToggled => {
                self.session.vr_active = !self.session.vr_active;
                log::info!("VR session {}", on_off(self.session.vr_active));
            }
            AppMsg::Tick => {
                self.session.elapsed += 1;
                if self.session.walking {
                    self.session.points += POINTS_PER_WALK_SECOND;
                }
                let scene = self.scene.borrow();
                scene.hud.set_timer(self.session.elapsed);
                scene.hud.set_points(self.session.points);
                self.drawing_area.queue_draw();
            }
            AppMsg::ConfigReload => match config::load_config(&self.config_path) {
                Ok(new_config) => {
                    self.apply_config(new_config, &sender);
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
    }
}

impl AppModel {
    fn apply_config(&mut self, config: Config, sender: &ComponentSender<Self>) {
        {
            let mut scene = self.scene.borrow_mut();
            scene.pointer.reset();
            if let Some(old) = scene.menu.take() {
                old.destroy();
            }
            let menu = mount_menu(&scene.document, &config.menu, sender, &self.drawing_area);
            scene.menu = menu;
            scene.hud.set_points_label(&config.hud.points_label);
            scene.hud.set_points(self.session.points);
        }
        self.config = config;
        self.drawing_area.queue_draw();
    }
}

use crate::dom::Element;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};
use strum::Display as StrumDisplay;

pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum TweenProp {
    Opacity,
    #[strum(serialize = "y")]
    TranslateY,
}

impl TweenProp {
    pub fn read(&self, el: &Element) -> f64 {
        match self {
            Self::Opacity => el
                .style("opacity")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(1.0),
            Self::TranslateY => el
                .style("transform")
                .and_then(|v| transform_value(&v, "translateY"))
                .unwrap_or(0.0),
        }
    }

    pub fn write(&self, el: &Element, value: f64) {
        match self {
            Self::Opacity => el.set_style("opacity", format!("{}", round3(value))),
            Self::TranslateY => el.set_style("transform", format!("translateY({}px)", round3(value))),
        }
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

pub fn transform_value(transform: &str, func: &str) -> Option<f64> {
    let start = transform.find(&format!("{func}("))? + func.len() + 1;
    let rest = &transform[start..];
    let arg = &rest[..rest.find(')')?];
    arg.trim()
        .trim_end_matches(|c: char| c.is_ascii_alphabetic())
        .parse()
        .ok()
}

pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

pub struct TweenSpec {
    pub duration: Duration,
    pub props: Vec<(TweenProp, f64)>,
    on_complete: Option<Box<dyn FnOnce()>>,
}

impl fmt::Debug for TweenSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenSpec")
            .field("duration", &self.duration)
            .field("props", &self.props)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl TweenSpec {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            props: Vec::new(),
            on_complete: None,
        }
    }

    pub fn opacity(mut self, value: f64) -> Self {
        self.props.push((TweenProp::Opacity, value));
        self
    }

    pub fn y(mut self, value: f64) -> Self {
        self.props.push((TweenProp::TranslateY, value));
        self
    }

    pub fn on_complete(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn target_value(&self, prop: TweenProp) -> Option<f64> {
        self.props
            .iter()
            .rev()
            .find(|(p, _)| *p == prop)
            .map(|(_, v)| *v)
    }

    pub fn has_completion(&self) -> bool {
        self.on_complete.is_some()
    }

    pub fn apply_final(&self, target: &Element) {
        for (prop, value) in &self.props {
            prop.write(target, *value);
        }
    }

    pub fn take_completion(&mut self) -> Option<Box<dyn FnOnce()>> {
        self.on_complete.take()
    }
}

pub trait Tween {
    fn to(&self, target: &Element, spec: TweenSpec);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Immediate;

impl Tween for Immediate {
    fn to(&self, target: &Element, mut spec: TweenSpec) {
        spec.apply_final(target);
        if let Some(done) = spec.take_completion() {
            done();
        }
    }
}

type Running = Rc<RefCell<Vec<(Element, Rc<Cell<bool>>)>>>;

pub struct Timeline {
    frame: Duration,
    redraw: Rc<dyn Fn()>,
    running: Running,
}

impl Timeline {
    pub fn new(redraw: impl Fn() + 'static) -> Self {
        Self {
            frame: FRAME_INTERVAL,
            redraw: Rc::new(redraw),
            running: Rc::default(),
        }
    }

    fn register(&self, target: &Element) -> Rc<Cell<bool>> {
        let mut running = self.running.borrow_mut();
        running.retain(|(el, cancelled)| {
            if el == target {
                cancelled.set(true);
            }
            el != target && !cancelled.get()
        });
        let cancelled = Rc::new(Cell::new(false));
        running.push((target.clone(), cancelled.clone()));
        cancelled
    }
}

impl Tween for Timeline {
    fn to(&self, target: &Element, mut spec: TweenSpec) {
        if spec.duration.is_zero() {
            Immediate.to(target, spec);
            (self.redraw)();
            return;
        }

        let tracks: Vec<(TweenProp, f64, f64)> = spec
            .props
            .iter()
            .map(|&(prop, to)| (prop, prop.read(target), to))
            .collect();
        let cancelled = self.register(target);
        let root = target.root();
        let target = target.clone();
        let duration = spec.duration.as_secs_f64();
        let started = Instant::now();
        let redraw = self.redraw.clone();
        let mut done = spec.take_completion();

        glib::timeout_add_local(self.frame, move || {
            if cancelled.get() {
                return glib::ControlFlow::Break;
            }
            if target.root() != root {
                log::debug!("Tween target {:?} detached, dropping animation", target);
                cancelled.set(true);
                return glib::ControlFlow::Break;
            }

            let t = (started.elapsed().as_secs_f64() / duration).min(1.0);
            let eased = ease_out_cubic(t);
            for (prop, from, to) in &tracks {
                prop.write(&target, from + (to - from) * eased);
            }
            redraw();

            if t < 1.0 {
                return glib::ControlFlow::Continue;
            }
            cancelled.set(true);
            if let Some(done) = done.take() {
                done();
            }
            glib::ControlFlow::Break
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_transform_value() {
        let cases = vec![
            ("scale(1.1)", "scale", Some(1.1)),
            ("translateY(20px)", "translateY", Some(20.0)),
            ("translateY(-4.5px) scale(2)", "scale", Some(2.0)),
            ("rotate(90deg)", "rotate", Some(90.0)),
            ("scale(1.1)", "translateY", None),
            ("scale(", "scale", None),
        ];

        for (input, func, expected) in cases {
            assert_eq!(transform_value(input, func), expected, "{input}");
        }
    }

    #[test]
    fn test_ease_out_cubic_bounds() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(2.0), 1.0);
        assert!(ease_out_cubic(0.5) > 0.5);
    }

    #[test]
    fn test_props_read_defaults() {
        let el = Element::create("div");
        assert_eq!(TweenProp::Opacity.read(&el), 1.0);
        assert_eq!(TweenProp::TranslateY.read(&el), 0.0);

        TweenProp::Opacity.write(&el, 0.25);
        TweenProp::TranslateY.write(&el, 12.0);
        assert_eq!(el.style("opacity").as_deref(), Some("0.25"));
        assert_eq!(el.style("transform").as_deref(), Some("translateY(12px)"));
        assert_eq!(TweenProp::TranslateY.read(&el), 12.0);
    }

    #[test]
    fn test_immediate_applies_and_completes() {
        let el = Element::create("div").with_style("opacity", "0");
        let completed = Rc::new(Cell::new(false));

        let flag = completed.clone();
        Immediate.to(
            &el,
            TweenSpec::new(Duration::from_millis(250))
                .opacity(1.0)
                .y(0.0)
                .on_complete(move || flag.set(true)),
        );

        assert!(completed.get());
        assert_eq!(el.style("opacity").as_deref(), Some("1"));
        assert_eq!(el.style("transform").as_deref(), Some("translateY(0px)"));
    }

    #[test]
    fn test_zero_duration_timeline_is_synchronous() {
        let redraws = Rc::new(Cell::new(0));
        let r = redraws.clone();
        let timeline = Timeline::new(move || r.set(r.get() + 1));
        let el = Element::create("div");

        timeline.to(&el, TweenSpec::new(Duration::ZERO).opacity(0.0));

        assert_eq!(el.style("opacity").as_deref(), Some("0"));
        assert_eq!(redraws.get(), 1);
    }

    // timeout_add_local acquires the global default context
    static MAIN_CONTEXT: Mutex<()> = Mutex::new(());

    fn run_until(limit: Duration, mut done: impl FnMut() -> bool) {
        let ctx = glib::MainContext::default();
        let started = Instant::now();
        while !done() && started.elapsed() < limit {
            ctx.iteration(false);
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    fn flag() -> (Rc<Cell<bool>>, impl FnOnce() + 'static) {
        let hit = Rc::new(Cell::new(false));
        let h = hit.clone();
        (hit, move || h.set(true))
    }

    #[test]
    fn test_timeline_retarget_cancels_running_tween() {
        let _guard = MAIN_CONTEXT.lock().unwrap_or_else(|e| e.into_inner());
        let timeline = Timeline::new(|| {});
        let el = Element::create("div").with_style("opacity", "1");

        let (first, on_first) = flag();
        timeline.to(
            &el,
            TweenSpec::new(Duration::from_secs(1))
                .opacity(0.0)
                .on_complete(on_first),
        );
        run_until(Duration::from_millis(40), || false);

        let (second, on_second) = flag();
        timeline.to(
            &el,
            TweenSpec::new(Duration::from_millis(60))
                .opacity(1.0)
                .on_complete(on_second),
        );
        run_until(Duration::from_secs(2), || second.get());
        run_until(Duration::from_millis(200), || false);

        assert!(second.get());
        assert!(!first.get());
        assert_eq!(el.style("opacity").as_deref(), Some("1"));
    }

    #[test]
    fn test_timeline_stops_when_target_detached() {
        let _guard = MAIN_CONTEXT.lock().unwrap_or_else(|e| e.into_inner());
        let redraws = Rc::new(Cell::new(0));
        let r = redraws.clone();
        let timeline = Timeline::new(move || r.set(r.get() + 1));
        let parent = Element::create("div");
        let el = Element::create("div");
        parent.append_child(&el);

        let (completed, on_complete) = flag();
        timeline.to(
            &el,
            TweenSpec::new(Duration::from_secs(1))
                .y(20.0)
                .on_complete(on_complete),
        );
        run_until(Duration::from_secs(2), || redraws.get() > 0);
        assert!(redraws.get() > 0);

        el.remove();
        let frames = redraws.get();
        run_until(Duration::from_millis(300), || false);

        assert!(!completed.get());
        assert_eq!(redraws.get(), frames);
    }

    #[test]
    fn test_timeline_runs_to_completion() {
        let _guard = MAIN_CONTEXT.lock().unwrap_or_else(|e| e.into_inner());
        let timeline = Timeline::new(|| {});
        let el = Element::create("div").with_style("opacity", "0");

        let (completed, on_complete) = flag();
        timeline.to(
            &el,
            TweenSpec::new(Duration::from_millis(50))
                .opacity(1.0)
                .on_complete(on_complete),
        );
        run_until(Duration::from_secs(2), || completed.get());

        assert!(completed.get());
        assert_eq!(el.style("opacity").as_deref(), Some("1"));
    }

    #[test]
    fn test_spec_target_value() {
        let spec = TweenSpec::new(Duration::ZERO).opacity(0.0).opacity(0.5);
        assert_eq!(spec.target_value(TweenProp::Opacity), Some(0.5));
        assert_eq!(spec.target_value(TweenProp::TranslateY), None);
        assert!(!spec.has_completion());
    }
}

use super::Element;
use derive_more::{Display, From, Into};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use strum::Display as StrumDisplay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum EventKind {
    Click,
    PointerEnter,
    PointerLeave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, Into)]
#[display("listener#{_0}")]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

pub type Handler = Rc<dyn Fn(&Element)>;

#[derive(Default)]
pub(crate) struct Listeners {
    entries: Vec<(ListenerId, EventKind, Handler)>,
}

impl Listeners {
    pub(crate) fn insert(&mut self, kind: EventKind, handler: Handler) -> ListenerId {
        let id = ListenerId::next();
        self.entries.push((id, kind, handler));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn handlers_for(&self, kind: EventKind) -> Vec<Handler> {
        self.entries
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, h)| h.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_listener_ids_are_unique() {
        let a = ListenerId::next();
        let b = ListenerId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_handlers_filtered_by_kind() {
        let hits = Rc::new(Cell::new(0));
        let mut table = Listeners::default();

        let h = hits.clone();
        table.insert(EventKind::Click, Rc::new(move |_: &Element| h.set(h.get() + 1)));
        table.insert(EventKind::PointerEnter, Rc::new(|_: &Element| {}));

        assert_eq!(table.handlers_for(EventKind::Click).len(), 1);
        assert_eq!(table.handlers_for(EventKind::PointerLeave).len(), 0);
        assert_eq!(table.len(), 2);

        let target = Element::create("button");
        for handler in table.handlers_for(EventKind::Click) {
            handler(&target);
        }
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_remove_reports_presence() {
        let mut table = Listeners::default();
        let id = table.insert(EventKind::Click, Rc::new(|_: &Element| {}));

        assert!(table.remove(id));
        assert!(!table.remove(id));
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_event_kind_display() {
        assert_eq!(EventKind::PointerEnter.to_string(), "pointerenter");
    }
}

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use crate::error::{GridError, Result};
use crate::state::data_model::RowId;
use crate::state::keyboard::{CellIndexCoordinates, KeyInput};
use crate::state::sorting::SortModel;
use crate::state::virtualization::ElementSize;

#[derive(Clone, Debug, PartialEq)]
pub enum GridEvent {
    KeyDown(KeyInput),
    KeyUp(KeyInput),
    FocusOut,
    MultipleKeyPressChanged(bool),
    Scrolling { active: bool },
    Resize(ElementSize),
    RowsUpdated,
    ColumnsUpdated,
    ColumnHeaderClick { field: String },
    RowClick { id: RowId },
    CellClick(CellIndexCoordinates),
    SortModelChanged(SortModel),
    PageChanged(usize),
    PageSizeChanged(usize),
    RowSelected { id: RowId, selected: bool },
    SelectionChanged(Vec<RowId>),
    RenderContextChanged,
    CellFocused(CellIndexCoordinates),
    CopyRequested(String),
    StateChanged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GridEventKind {
    KeyDown,
    KeyUp,
    FocusOut,
    MultipleKeyPressChanged,
    Scrolling,
    Resize,
    RowsUpdated,
    ColumnsUpdated,
    ColumnHeaderClick,
    RowClick,
    CellClick,
    SortModelChanged,
    PageChanged,
    PageSizeChanged,
    RowSelected,
    SelectionChanged,
    RenderContextChanged,
    CellFocused,
    CopyRequested,
    StateChanged,
}

impl GridEvent {
    pub fn kind(&self) -> GridEventKind {
        match self {
            Self::KeyDown(_) => GridEventKind::KeyDown,
            Self::KeyUp(_) => GridEventKind::KeyUp,
            Self::FocusOut => GridEventKind::FocusOut,
            Self::MultipleKeyPressChanged(_) => GridEventKind::MultipleKeyPressChanged,
            Self::Scrolling { .. } => GridEventKind::Scrolling,
            Self::Resize(_) => GridEventKind::Resize,
            Self::RowsUpdated => GridEventKind::RowsUpdated,
            Self::ColumnsUpdated => GridEventKind::ColumnsUpdated,
            Self::ColumnHeaderClick { .. } => GridEventKind::ColumnHeaderClick,
            Self::RowClick { .. } => GridEventKind::RowClick,
            Self::CellClick(_) => GridEventKind::CellClick,
            Self::SortModelChanged(_) => GridEventKind::SortModelChanged,
            Self::PageChanged(_) => GridEventKind::PageChanged,
            Self::PageSizeChanged(_) => GridEventKind::PageSizeChanged,
            Self::RowSelected { .. } => GridEventKind::RowSelected,
            Self::SelectionChanged(_) => GridEventKind::SelectionChanged,
            Self::RenderContextChanged => GridEventKind::RenderContextChanged,
            Self::CellFocused(_) => GridEventKind::CellFocused,
            Self::CopyRequested(_) => GridEventKind::CopyRequested,
            Self::StateChanged => GridEventKind::StateChanged,
        }
    }
}

pub type EventHandler = Rc<dyn Fn(&GridEvent) -> Result<()>>;
pub type FaultReporter = Rc<dyn Fn(GridEventKind, &GridError)>;

struct Listener {
    id: u64,
    kind: GridEventKind,
    handler: EventHandler,
    once: bool,
}

struct BusInner {
    listeners: RefCell<Vec<Listener>>,
    next_id: Cell<u64>,
    reporter: RefCell<Option<FaultReporter>>,
}

impl BusInner {
    fn remove(&self, id: u64) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|listener| listener.id != id);
        listeners.len() != before
    }

    fn is_live(&self, id: u64) -> bool {
        self.listeners.borrow().iter().any(|listener| listener.id == id)
    }
}

/// A failing or panicking handler is reported and skipped; the remaining
/// subscribers still receive the event.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<BusInner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(BusInner {
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
                reporter: RefCell::new(None),
            }),
        }
    }

    pub fn subscribe(
        &self,
        kind: GridEventKind,
        handler: impl Fn(&GridEvent) -> Result<()> + 'static,
    ) -> Subscription {
        self.register(kind, Rc::new(handler), false)
    }

    /// Registers a handler that is removed right before its first invocation.
    pub fn once(
        &self,
        kind: GridEventKind,
        handler: impl Fn(&GridEvent) -> Result<()> + 'static,
    ) -> Subscription {
        self.register(kind, Rc::new(handler), true)
    }

    /// Replaces the host hook that receives handler faults.
    pub fn set_fault_reporter(&self, reporter: impl Fn(GridEventKind, &GridError) + 'static) {
        *self.inner.reporter.borrow_mut() = Some(Rc::new(reporter));
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    pub fn clear(&self) {
        self.inner.listeners.borrow_mut().clear();
    }

    /// Delivers `event` to every subscriber of its kind, in subscription order.
    pub fn publish(&self, event: &GridEvent) -> Result<()> {
        let kind = event.kind();
        let targets: Vec<(u64, EventHandler, bool)> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .filter(|listener| listener.kind == kind)
            .map(|listener| (listener.id, Rc::clone(&listener.handler), listener.once))
            .collect();

        let mut faults = Vec::new();
        for (id, handler, once) in targets {
            // An earlier handler may have unsubscribed this one.
            if once {
                if !self.inner.remove(id) {
                    continue;
                }
            } else if !self.inner.is_live(id) {
                continue;
            }

            match panic::catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => faults.push(err),
                Err(payload) => faults.push(GridError::HandlerPanicked(panic_message(payload))),
            }
        }

        if faults.is_empty() {
            return Ok(());
        }

        let reporter = self.inner.reporter.borrow().clone();
        for fault in &faults {
            match reporter.as_ref() {
                Some(report) => report(kind, fault),
                None => tracing::error!(event = ?kind, error = %fault, "grid event handler failed"),
            }
        }
        Err(GridError::HandlerFaults {
            event: kind,
            faults,
        })
    }

    fn register(&self, kind: GridEventKind, handler: EventHandler, once: bool) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.listeners.borrow_mut().push(Listener {
            id,
            kind,
            handler,
            once,
        });
        Subscription {
            id,
            bus: Rc::downgrade(&self.inner),
        }
    }
}

/// Handle returned by [`EventBus::subscribe`] and [`EventBus::once`].
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    bus: Weak<BusInner>,
}

impl Subscription {
    /// Detaches the handler. Returns `false` when it was already gone.
    pub fn unsubscribe(&self) -> bool {
        self.bus
            .upgrade()
            .map(|bus| bus.remove(self.id))
            .unwrap_or(false)
    }

    pub fn is_active(&self) -> bool {
        self.bus
            .upgrade()
            .map(|bus| bus.is_live(self.id))
            .unwrap_or(false)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

//! Request generations.
//!
//! Every outgoing request takes a ticket from its class counter. Only the
//! holder of the newest ticket of a class may write its result to the page;
//! older completions are dropped.
//!
//! `Selection` counts user interactions that pick a location (startup, map
//! click, search). Every lookup chain also carries the selection ticket it
//! was started under, so a newer pick stops the older chain.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestClass {
    Weather,
    ReverseGeocode,
    Search,
    Selection,
}

impl RequestClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::ReverseGeocode => "reverse_geocode",
            Self::Search => "search",
            Self::Selection => "selection",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Weather => 0,
            Self::ReverseGeocode => 1,
            Self::Search => 2,
            Self::Selection => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub class: RequestClass,
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct RequestGenerations {
    latest: [AtomicU64; 4],
}

impl RequestGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket newer than every earlier ticket of `class`
    pub fn begin(&self, class: RequestClass) -> Ticket {
        let generation = self.latest[class.index()].fetch_add(1, Ordering::SeqCst) + 1;
        Ticket { class, generation }
    }

    /// Ticket for the newest generation of `class` without issuing a new one
    pub fn current(&self, class: RequestClass) -> Ticket {
        Ticket {
            class,
            generation: self.latest(class),
        }
    }

    /// True while no newer ticket of the same class has been issued
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest[ticket.class.index()].load(Ordering::SeqCst) == ticket.generation
    }

    pub fn latest(&self, class: RequestClass) -> u64 {
        self.latest[class.index()].load(Ordering::SeqCst)
    }
}

//! Host command routing.
//!
//! Inbound messages are matched by exact address against an ordered route
//! table built from the profile's [`RouteSet`]. The first matching route
//! wins; messages with no route, or with arguments a route cannot use, are
//! dropped without reply.

use heapless::Vec;

use crate::io::Rgb;
use crate::profile::RouteSet;
use crate::wire::Message;

/// Capacity of the route table.
pub const MAX_ROUTES: usize = 8;

/// Decoded host command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// `/ready`: the host finished booting.
    Ready,
    /// `/led i`: set the indicator to colour code `i`.
    Led(Rgb),
    /// `/shutdown`: start the shutdown sequence.
    Shutdown,
    /// `/nf`: request a snapshot after the rate gate.
    NewFrame,
    /// `/getknobs`: send knob values now.
    GetKnobs,
}

/// Route table entry tag: which [`Command`] an address decodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandKind {
    Ready,
    Led,
    Shutdown,
    NewFrame,
    GetKnobs,
}

impl CommandKind {
    pub fn address(&self) -> &'static str {
        match self {
            CommandKind::Ready => "/ready",
            CommandKind::Led => "/led",
            CommandKind::Shutdown => "/shutdown",
            CommandKind::NewFrame => "/nf",
            CommandKind::GetKnobs => "/getknobs",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Route {
    address: &'static str,
    kind: CommandKind,
}

/// Ordered address → command table.
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<Route, MAX_ROUTES>,
}

impl Router {
    /// Build the table for `routes`. `/ready` is always present.
    pub fn new(routes: RouteSet) -> Self {
        let mut router = Self { routes: Vec::new() };
        router.register(CommandKind::Ready);
        if routes.led {
            router.register(CommandKind::Led);
        }
        if routes.shutdown {
            router.register(CommandKind::Shutdown);
        }
        if routes.new_frame {
            router.register(CommandKind::NewFrame);
        }
        if routes.get_knobs {
            router.register(CommandKind::GetKnobs);
        }
        router
    }

    fn register(&mut self, kind: CommandKind) {
        // At most five fixed routes, below capacity.
        let _ = self.routes.push(Route {
            address: kind.address(),
            kind,
        });
    }

    /// Decode `msg` into a command, or `None` if it has no route or its
    /// arguments don't fit.
    pub fn route(&self, msg: &Message) -> Option<Command> {
        let route = self.routes.iter().find(|r| r.address == msg.address())?;
        let command = match route.kind {
            CommandKind::Ready => Command::Ready,
            CommandKind::Led => Command::Led(Rgb::from_code(msg.int(0)?)),
            CommandKind::Shutdown => Command::Shutdown,
            CommandKind::NewFrame => Command::NewFrame,
            CommandKind::GetKnobs => Command::GetKnobs,
        };
        Some(command)
    }
}

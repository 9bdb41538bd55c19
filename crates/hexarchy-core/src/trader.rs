//! Traders - resource carriers following a fixed route between improvements.
//!
//! A trader cycles producer -> sink -> producer. The outbound leg carries
//! goods loaded at the producer (during the producer's `work` distribution)
//! and unloads at the sink; the return leg runs empty back to the producer.
//! Traders live in the map's trader arena and are reaped at the end of a map
//! turn once expired.

use crate::hex::Coord;
use crate::types::{CivId, TraderId};
use crate::yields::Yield;
use serde::{Deserialize, Serialize};

/// Per-key cargo limit for a single trader.
pub const TRADER_CAPACITY: Yield = Yield::new(10, 10, 10, 10);

/// Tiles a trader advances per turn.
pub const TRADER_SPEED: u32 = 1;

/// A finite ordered path from a producer to a sink.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Coordinates from the producer tile through the sink tile, inclusive.
    pub path: Vec<Coord>,
    /// Total movement-cost distance of the path.
    pub distance: u32,
}

impl Route {
    /// Create a route. The path must hold at least the two endpoints.
    pub fn new(path: Vec<Coord>, distance: u32) -> Self {
        debug_assert!(path.len() >= 2);
        Self { path, distance }
    }

    /// The producer endpoint.
    pub fn producer(&self) -> Coord {
        self.path[0]
    }

    /// The sink endpoint.
    pub fn sink(&self) -> Coord {
        *self.path.last().expect("route path is never empty")
    }
}

/// Which leg of the round trip the trader is on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeLeg {
    #[default]
    Outbound,
    Return,
}

/// A ticking resource carrier between two improvements.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trader {
    /// Unique identifier.
    pub id: TraderId,
    /// Owning civilization.
    pub civ_id: CivId,
    /// The fixed path this trader follows.
    pub route: Route,
    /// Tiles advanced per turn.
    pub speed: u32,
    /// Per-key cargo limit.
    pub capacity: Yield,
    /// Currently carried cargo.
    pub carried: Yield,
    /// Expired traders are reaped at the end of the map turn.
    pub expired: bool,
    /// Index into the route path.
    pub position: usize,
    /// Current leg of the round trip.
    pub leg: TradeLeg,
}

impl Trader {
    /// Create a new trader at the producer end of its route.
    pub fn new(id: TraderId, civ_id: CivId, route: Route, capacity: Yield) -> Self {
        Self {
            id,
            civ_id,
            route,
            speed: TRADER_SPEED,
            capacity,
            carried: Yield::zero(),
            expired: false,
            position: 0,
            leg: TradeLeg::Outbound,
        }
    }

    /// Load up to the free cargo space from `share`; returns the surplus
    /// that did not fit.
    pub fn store(&mut self, share: Yield) -> Yield {
        let room = self.capacity - self.carried;
        let loaded = share.min(&room);
        self.carried += loaded;
        share - loaded
    }

    /// Is the trader currently standing on the producer tile?
    pub fn at_producer(&self) -> bool {
        self.position == 0
    }

    /// Is the trader currently standing on the sink tile?
    pub fn at_sink(&self) -> bool {
        self.position + 1 == self.route.path.len()
    }

    /// Current position on the map.
    pub fn coords(&self) -> Coord {
        self.route.path[self.position]
    }

    /// Advance `speed` steps along the route, turning around at either end.
    ///
    /// Returns the cargo to unload each time the sink is reached (drained
    /// from the trader); the caller credits it to the sink improvement.
    pub fn shunt(&mut self) -> Yield {
        let mut delivered = Yield::zero();
        let last = self.route.path.len() - 1;
        for _ in 0..self.speed {
            match self.leg {
                TradeLeg::Outbound => {
                    if self.position < last {
                        self.position += 1;
                    }
                    if self.position == last {
                        delivered += std::mem::take(&mut self.carried);
                        self.leg = TradeLeg::Return;
                    }
                }
                TradeLeg::Return => {
                    if self.position > 0 {
                        self.position -= 1;
                    }
                    if self.position == 0 {
                        self.leg = TradeLeg::Outbound;
                    }
                }
            }
        }
        delivered
    }

    /// Mark the trader for reaping.
    pub fn expire(&mut self) {
        self.expired = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_route(len: usize) -> Route {
        let path: Vec<Coord> = (0..len as i32).map(|x| Coord::new(x, 0)).collect();
        Route::new(path, len as u32 - 1)
    }

    #[test]
    fn test_route_endpoints() {
        let route = straight_route(4);
        assert_eq!(route.producer(), Coord::new(0, 0));
        assert_eq!(route.sink(), Coord::new(3, 0));
    }

    #[test]
    fn test_store_respects_capacity() {
        let mut trader = Trader::new(1, 0, straight_route(3), Yield::food(10));
        let surplus = trader.store(Yield::food(7));
        assert_eq!(surplus, Yield::zero());
        let surplus = trader.store(Yield::food(7));
        assert_eq!(surplus, Yield::food(4));
        assert_eq!(trader.carried, Yield::food(10));
    }

    #[test]
    fn test_shunt_delivers_at_sink() {
        let mut trader = Trader::new(1, 0, straight_route(3), Yield::food(10));
        trader.store(Yield::food(6));

        assert_eq!(trader.shunt(), Yield::zero());
        assert_eq!(trader.position, 1);

        let delivered = trader.shunt();
        assert_eq!(delivered, Yield::food(6));
        assert!(trader.at_sink());
        assert_eq!(trader.carried, Yield::zero());
        assert_eq!(trader.leg, TradeLeg::Return);
    }

    #[test]
    fn test_round_trip_returns_to_producer() {
        let mut trader = Trader::new(1, 0, straight_route(3), Yield::food(10));
        for _ in 0..4 {
            trader.shunt();
        }
        assert!(trader.at_producer());
        assert_eq!(trader.leg, TradeLeg::Outbound);
    }

    #[test]
    fn test_two_tile_route_cycles() {
        let mut trader = Trader::new(1, 0, straight_route(2), Yield::food(10));
        trader.store(Yield::food(3));
        assert_eq!(trader.shunt(), Yield::food(3));
        trader.shunt();
        assert!(trader.at_producer());
    }
}

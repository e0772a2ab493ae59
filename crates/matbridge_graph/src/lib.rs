// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shading graph model for `MatBridge`.
//!
//! This crate holds everything the translation engine needs to know about a
//! host scene without depending on any particular host:
//! - Typed attribute values and host type tags
//! - Plugs (node + socket) and socket-level edges
//! - The [`SceneAdapter`] contract a host binding implements
//! - The boundary-respecting [`Crawler`] that discovers a shading network
//! - [`MemoryScene`], an in-memory host used by tests and the CLI
//!
//! ## Architecture
//!
//! Discovery produces a [`NodeSet`]: one [`Node`] record per discovered scene
//! node, in first-discovery order, each carrying its incoming and outgoing
//! edges. The set is owned by a single conversion run.

pub mod value;
pub mod node;
pub mod plug;
pub mod edge;
pub mod graph;
pub mod scene;
pub mod crawl;
pub mod memory;

pub use value::{AttrType, AttrValue};
pub use node::{Node, NodeId};
pub use plug::Plug;
pub use edge::{Connection, Direction, Edge};
pub use graph::{CrawlGap, NodeSet};
pub use scene::{SceneAdapter, SceneError};
pub use crawl::{Crawler, DEFAULT_STOP_LIST};
pub use memory::{AttrSpec, MemoryAttribute, MemoryNode, MemoryScene, NodeTemplate};

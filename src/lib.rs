pub mod config;
pub mod error;
pub mod cell;
pub mod segment;
pub mod block;
pub mod breach;
pub mod outlet;
pub mod lookup;
pub mod inputs;
pub mod bfile;

pub use bfile::{AmendReport, BFile};
pub use block::{Block, DefaultBlock};
pub use breach::{BreachDataBlock, BreachStructure, StructureLayout};
pub use cell::{encode_float, tokenize, Cell, Row};
pub use config::UnknownStructurePolicy;
pub use error::{BFileError, Result};
pub use inputs::{load_flows, parse_flows, FragilityResult, FragilityResults};
pub use lookup::StructureLookup;
pub use outlet::{FlowPair, OutletTimeSeries};

//! Typed indices into the stage graph's component, port and node tables.

use core::fmt;
use core::num::NonZeroU32;

macro_rules! graph_id {
    ($(#[$doc:meta])* $name:ident, $tag:literal) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Id for table slot `index`.
            pub fn from_index(index: u32) -> Self {
                // Slot u32::MAX is never allocated; saturate instead of panicking
                Self(NonZeroU32::new(index.saturating_add(1)).unwrap_or(NonZeroU32::MAX))
            }

            /// Table slot of this id.
            pub fn index(self) -> u32 {
                self.0.get() - 1
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "#{}"), self.index())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.index())
            }
        }
    };
}

graph_id!(
    /// A stage in the network.
    CompId,
    "comp"
);
graph_id!(
    /// A named input or output of a stage.
    PortId,
    "port"
);
graph_id!(
    /// The value one outlet publishes to its readers.
    NodeId,
    "node"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_survives_the_niche_offset() {
        for i in [0_u32, 1, 9, 4_096] {
            assert_eq!(PortId::from_index(i).index(), i);
        }
        assert_eq!(format!("{:?}", CompId::from_index(3)), "comp#3");
        assert_eq!(NodeId::from_index(5).to_string(), "5");
    }

    #[test]
    fn unconnected_port_costs_nothing() {
        assert_eq!(
            core::mem::size_of::<Option<NodeId>>(),
            core::mem::size_of::<NodeId>()
        );
    }
}

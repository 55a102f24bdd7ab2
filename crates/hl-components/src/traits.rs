//! Core traits for stage models.

use crate::error::{ComponentError, ComponentResult};
use crate::flow::FlowState;
use hl_core::units::{Area, Force, Power, Pressure};
use hl_fluids::FluidModel;
use hl_graph::{Dimension, PortSpec, SignalKind};

/// A value travelling along one edge of the network.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Flow(FlowState),
    Power(Power),
    Force(Force),
    Pressure(Pressure),
    Area(Area),
}

impl Signal {
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::Flow(_) => SignalKind::Flow,
            Signal::Power(_) => SignalKind::Scalar(Dimension::Power),
            Signal::Force(_) => SignalKind::Scalar(Dimension::Force),
            Signal::Pressure(_) => SignalKind::Scalar(Dimension::Pressure),
            Signal::Area(_) => SignalKind::Scalar(Dimension::Area),
        }
    }

    /// SI value of a scalar signal; `None` for flow stations.
    pub fn scalar_value(&self) -> Option<f64> {
        match self {
            Signal::Flow(_) => None,
            Signal::Power(v) => Some(v.value),
            Signal::Force(v) => Some(v.value),
            Signal::Pressure(v) => Some(v.value),
            Signal::Area(v) => Some(v.value),
        }
    }

    pub fn as_flow(&self, port: &'static str) -> ComponentResult<&FlowState> {
        match self {
            Signal::Flow(flow) => Ok(flow),
            other => Err(mismatch(port, SignalKind::Flow, other)),
        }
    }

    pub fn as_power(&self, port: &'static str) -> ComponentResult<Power> {
        match self {
            Signal::Power(v) => Ok(*v),
            other => Err(mismatch(port, SignalKind::Scalar(Dimension::Power), other)),
        }
    }

    pub fn as_force(&self, port: &'static str) -> ComponentResult<Force> {
        match self {
            Signal::Force(v) => Ok(*v),
            other => Err(mismatch(port, SignalKind::Scalar(Dimension::Force), other)),
        }
    }

    pub fn as_pressure(&self, port: &'static str) -> ComponentResult<Pressure> {
        match self {
            Signal::Pressure(v) => Ok(*v),
            other => Err(mismatch(port, SignalKind::Scalar(Dimension::Pressure), other)),
        }
    }
}

fn mismatch(port: &'static str, expected: SignalKind, found: &Signal) -> ComponentError {
    ComponentError::UnexpectedSignal {
        port,
        expected,
        found: found.kind(),
    }
}

/// Signal at position `idx` of a stage's inputs.
pub fn input_at<'a>(
    inputs: &'a [Signal],
    idx: usize,
    port: &'static str,
) -> ComponentResult<&'a Signal> {
    inputs.get(idx).ok_or(ComponentError::InvalidArg { what: port })
}

/// Trait for stages of the compression-system network.
///
/// A stage declares its ports once and maps the signals arriving on its
/// inputs to fresh signals on its outputs. Stages own their parameters, hold
/// no mutable state and are deterministic, so a built network can be shared
/// across threads.
pub trait Stage: Send + Sync {
    /// Stage name, unique within a network.
    fn name(&self) -> &str;

    /// Input ports, in the order `evaluate` receives them.
    fn inputs(&self) -> &'static [PortSpec];

    /// Output ports, in the order `evaluate` returns them.
    fn outputs(&self) -> &'static [PortSpec];

    /// Transform input signals into output signals.
    ///
    /// # Arguments
    /// * `fluid` - Gas property oracle
    /// * `inputs` - One signal per entry of `inputs()`
    ///
    /// # Returns
    /// One signal per entry of `outputs()`
    fn evaluate(&self, fluid: &dyn FluidModel, inputs: &[Signal]) -> ComponentResult<Vec<Signal>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use hl_core::units::{newtons, pa, watts};

    #[test]
    fn scalar_accessors() {
        let p = Signal::Pressure(pa(99.0));
        assert_eq!(p.as_pressure("ps").unwrap().value, 99.0);
        assert_eq!(p.scalar_value(), Some(99.0));
        assert_eq!(p.kind(), SignalKind::Scalar(Dimension::Pressure));

        let err = Signal::Power(watts(1.0)).as_force("fg").unwrap_err();
        assert!(matches!(
            err,
            ComponentError::UnexpectedSignal {
                port: "fg",
                found: SignalKind::Scalar(Dimension::Power),
                ..
            }
        ));
        assert!(Signal::Force(newtons(2.0)).as_flow("flow_in").is_err());
    }

    #[test]
    fn missing_input_is_reported() {
        let inputs = [Signal::Force(newtons(1.0))];
        assert!(input_at(&inputs, 0, "a").is_ok());
        assert!(matches!(
            input_at(&inputs, 1, "b"),
            Err(ComponentError::InvalidArg { what: "b" })
        ));
    }
}

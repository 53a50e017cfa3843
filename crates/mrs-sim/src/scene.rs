//! Renderer-facing frame description
//!
//! A [`FrameState`] is everything a plotting front end needs to draw one
//! frame: the curves to show, the text to place, and for the precession view
//! the magnetization arrows. Frame states are built fresh for every call and
//! never depend on previously rendered frames.

use serde::{Deserialize, Serialize};

use crate::phase::Phase;

/// What a trace represents in the picture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceRole {
    /// One species or part signal
    Component,
    /// Sum of all species signals
    Composite,
    /// Normalized (and possibly scaled) reference signal
    Basis,
    /// Σ basis · concentration
    Fit,
    /// Any other curve (build-up FID, spectrum, recorded FID)
    Auxiliary,
}

/// A visible real-valued curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub name: String,
    pub role: TraceRole,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Trace {
    pub fn new(name: impl Into<String>, role: TraceRole, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            role,
            x,
            y,
        }
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Position and value of the largest sample
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.y
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
                Some((_, b)) if b >= v => best,
                _ => Some((i, v)),
            })
            .and_then(|(i, v)| self.x.get(i).map(|&x| (x, v)))
    }
}

/// Where a label is placed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LabelAnchor {
    /// Row of a stacked legend column (0 at the top)
    Stacked { row: usize },
    /// Data-space position
    Point { x: f64, y: f64 },
    /// Free text panel beside the plot
    Panel,
}

/// Text attached to a trace or to the panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Name of the trace or element the label describes
    pub target: String,
    pub text: String,
    pub anchor: LabelAnchor,
}

impl Label {
    pub fn new(target: impl Into<String>, text: impl Into<String>, anchor: LabelAnchor) -> Self {
        Self {
            target: target.into(),
            text: text.into(),
            anchor,
        }
    }

    /// Label over a trace peak, raised by 5 % of the peak height
    pub fn above_peak(target: impl Into<String>, text: impl Into<String>, trace: &Trace) -> Self {
        let anchor = match trace.peak() {
            Some((x, y)) => LabelAnchor::Point { x, y: y * 1.05 },
            None => LabelAnchor::Panel,
        };
        Self::new(target, text, anchor)
    }
}

/// A magnetization arrow from the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Named arrow in a 3D view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub name: String,
    pub vector: Vector3,
}

/// Complete description of one rendered frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameState {
    pub frame: usize,
    pub progress: f64,
    /// Basis-fitting phase, absent for scenarios without phases
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    pub traces: Vec<Trace>,
    pub labels: Vec<Label>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arrows: Vec<Arrow>,
}

impl FrameState {
    pub fn new(frame: usize, progress: f64, phase: Option<Phase>) -> Self {
        Self {
            frame,
            progress,
            phase,
            traces: Vec::new(),
            labels: Vec::new(),
            arrows: Vec::new(),
        }
    }

    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.traces.iter().find(|t| t.name == name)
    }

    pub fn traces_with_role(&self, role: TraceRole) -> impl Iterator<Item = &Trace> + '_ {
        self.traces.iter().filter(move |t| t.role == role)
    }

    pub fn label_for(&self, target: &str) -> Option<&Label> {
        self.labels.iter().find(|l| l.target == target)
    }
}

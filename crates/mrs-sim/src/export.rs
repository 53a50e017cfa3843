//! Scene stream export
//!
//! A scene stream is JSON Lines: one [`SceneHeader`] object, then one
//! [`FrameState`] object per emitted frame. Renderers read it line by line
//! and never need more than one frame in memory.

use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

use mrs_core::{MrsConfig, MrsError};

use crate::phase::Phase;
use crate::scenario::Scenario;
use crate::scene::FrameState;

/// Errors while writing or reading a scene stream
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Render error: {0}")]
    Render(#[from] MrsError),

    #[error("Malformed scene stream: {0}")]
    Malformed(String),
}

/// First line of a scene stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneHeader {
    pub scenario: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub total_frames: usize,
    pub fps: u32,
    pub frame_interval_ms: f64,
    pub sample_rate: f64,
    pub sample_count: usize,
    /// Time-axis step in seconds
    pub dwell_time_s: f64,
    /// Length of the FID in seconds
    pub acquisition_time_s: f64,
    /// Spacing of the spectral bins in Hz
    pub frequency_resolution_hz: f64,
    /// Frames between emitted frames
    pub stride: usize,
}

impl SceneHeader {
    pub fn new(scenario: &dyn Scenario, config: &MrsConfig, stride: usize) -> Self {
        let info = scenario.info();
        Self {
            scenario: info.name.to_string(),
            title: info.title,
            x_label: info.x_label.to_string(),
            y_label: info.y_label.to_string(),
            total_frames: scenario.total_frames(),
            fps: config.animation.fps,
            frame_interval_ms: config.animation.frame_interval_ms(),
            sample_rate: config.acquisition.sample_rate,
            sample_count: config.acquisition.sample_count,
            dwell_time_s: config.acquisition.dwell_time(),
            acquisition_time_s: config.acquisition.acquisition_time(),
            frequency_resolution_hz: config.acquisition.frequency_resolution(),
            stride: stride.max(1),
        }
    }
}

/// Writes a header and frame states as JSON Lines
pub struct SceneWriter<W: Write> {
    writer: W,
    frames_written: usize,
}

impl<W: Write> SceneWriter<W> {
    pub fn new(mut writer: W, header: &SceneHeader) -> Result<Self, ExportError> {
        serde_json::to_writer(&mut writer, header)?;
        writer.write_all(b"\n")?;
        Ok(Self {
            writer,
            frames_written: 0,
        })
    }

    pub fn write_frame(&mut self, state: &FrameState) -> Result<(), ExportError> {
        serde_json::to_writer(&mut self.writer, state)?;
        self.writer.write_all(b"\n")?;
        self.frames_written += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> Result<W, ExportError> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Render every `stride`-th frame of `scenario` into `writer`
///
/// Returns the number of frames written.
pub fn export_scene<W: Write>(
    scenario: &dyn Scenario,
    header: &SceneHeader,
    writer: W,
) -> Result<usize, ExportError> {
    let mut scene = SceneWriter::new(writer, header)?;
    for frame in (0..scenario.total_frames()).step_by(header.stride.max(1)) {
        let state = scenario.render_state(frame)?;
        scene.write_frame(&state)?;
    }
    let written = scene.frames_written();
    scene.finish()?;

    tracing::info!(
        scenario = %header.scenario,
        frames = written,
        "scene stream written"
    );
    Ok(written)
}

/// Read a scene stream back into its header and frames
pub fn read_scene<R: BufRead>(reader: R) -> Result<(SceneHeader, Vec<FrameState>), ExportError> {
    let mut lines = reader.lines();
    let header_line = lines
        .next()
        .ok_or_else(|| ExportError::Malformed("missing header line".to_string()))??;
    let header: SceneHeader = serde_json::from_str(&header_line)?;

    let mut frames = Vec::new();
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        frames.push(serde_json::from_str(&line)?);
    }
    Ok((header, frames))
}

/// Contiguous frames sharing one phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSpan {
    pub phase: Phase,
    pub first_frame: usize,
    pub last_frame: usize,
}

/// Timing overview of a scenario run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSummary {
    pub scenario: String,
    pub title: String,
    pub total_frames: usize,
    pub duration_s: f64,
    /// Empty for scenarios without phases
    pub phases: Vec<PhaseSpan>,
}

impl SceneSummary {
    pub fn compute(scenario: &dyn Scenario, fps: u32) -> Self {
        let info = scenario.info();
        let total = scenario.total_frames();

        let phases = scenario
            .phase_ranges()
            .into_iter()
            .map(|(phase, first_frame, last_frame)| PhaseSpan {
                phase,
                first_frame,
                last_frame,
            })
            .collect();

        Self {
            scenario: info.name.to_string(),
            title: info.title,
            total_frames: total,
            duration_s: if fps == 0 { 0.0 } else { total as f64 / fps as f64 },
            phases,
        }
    }

    /// Plain-text table
    pub fn to_table(&self) -> String {
        let mut out = format!(
            "{} ({})\n{} frames, {:.2} s\n",
            self.title, self.scenario, self.total_frames, self.duration_s
        );
        if !self.phases.is_empty() {
            out.push_str(&format!("{:<20} {:>8} {:>8}\n", "phase", "first", "last"));
            for span in &self.phases {
                out.push_str(&format!(
                    "{:<20} {:>8} {:>8}\n",
                    span.phase.name(),
                    span.first_frame,
                    span.last_frame
                ));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{build_scenario, BasisFitScenario};
    use mrs_core::ScenarioKind;
    use std::io::Cursor;

    fn small_config(kind: ScenarioKind) -> MrsConfig {
        let mut config = MrsConfig::for_scenario(kind);
        config.acquisition.sample_count = 256;
        config.animation.frames = Some(20);
        config
    }

    #[test]
    fn test_stream_layout() {
        let config = small_config(ScenarioKind::BasisFit);
        let scenario = build_scenario(&config).unwrap();
        let header = SceneHeader::new(scenario.as_ref(), &config, 1);

        let mut buffer = Vec::new();
        let written = export_scene(scenario.as_ref(), &header, &mut buffer).unwrap();
        assert_eq!(written, 20);

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().count(), 21);

        let (parsed_header, frames) = read_scene(Cursor::new(text)).unwrap();
        assert_eq!(parsed_header, header);
        // 2000 Hz over 256 points
        assert_eq!(header.dwell_time_s, 0.0005);
        assert_eq!(header.acquisition_time_s, 0.128);
        assert_eq!(header.frequency_resolution_hz, 7.8125);
        assert_eq!(frames.len(), 20);

        let direct = scenario.render_state(7).unwrap();
        assert_eq!(frames[7].frame, 7);
        assert_eq!(frames[7].phase, direct.phase);
        assert_eq!(frames[7].labels, direct.labels);
        let names = |s: &FrameState| s.traces.iter().map(|t| t.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&frames[7]), names(&direct));
    }

    #[test]
    fn test_stride() {
        let config = small_config(ScenarioKind::ProtonScaling);
        let scenario = build_scenario(&config).unwrap();
        let header = SceneHeader::new(scenario.as_ref(), &config, 3);

        let mut buffer = Vec::new();
        let written = export_scene(scenario.as_ref(), &header, &mut buffer).unwrap();
        // Frames 0, 3, ..., 18
        assert_eq!(written, 7);

        let (_, frames) = read_scene(Cursor::new(buffer)).unwrap();
        assert_eq!(frames.last().unwrap().frame, 18);
    }

    #[test]
    fn test_summary_phases() {
        let mut config = small_config(ScenarioKind::BasisFit);
        config.animation.frames = Some(100);
        let scenario = build_scenario(&config).unwrap();
        let summary = SceneSummary::compute(scenario.as_ref(), config.animation.fps);

        assert_eq!(summary.phases.len(), 5);
        assert_eq!(summary.phases[1].first_frame, 30);
        assert_eq!(summary.phases[4].last_frame, 99);

        let direct = BasisFitScenario::from_config(&config).unwrap();
        let spans: Vec<(Phase, usize, usize)> = summary
            .phases
            .iter()
            .map(|p| (p.phase, p.first_frame, p.last_frame))
            .collect();
        assert_eq!(spans, direct.sequencer().frame_ranges());
        assert!(summary.to_table().contains("scale_basis"));
    }

    #[test]
    fn test_summary_without_phases() {
        let config = small_config(ScenarioKind::SpinPrecession);
        let scenario = build_scenario(&config).unwrap();
        let summary = SceneSummary::compute(scenario.as_ref(), 30);
        assert!(summary.phases.is_empty());
        assert!(!summary.to_table().contains("first"));
    }

    #[test]
    fn test_read_empty_stream() {
        assert!(matches!(
            read_scene(Cursor::new("")),
            Err(ExportError::Malformed(_))
        ));
    }
}

use crate::core::io::xdatcar::Trajectory;
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("Trajectory has no frames to select from")]
    EmptyTrajectory,
    #[error("Ionic time step (POTIM) must be positive, got {0} fs")]
    InvalidTimeStep(f64),
}

/// A frame chosen for one requested simulation time.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotSelection {
    /// The time the caller asked for, in ps.
    pub requested_ps: f64,
    /// Index of the chosen frame within the trajectory.
    pub frame_index: usize,
    /// Actual simulation time of that frame, in ps.
    pub actual_ps: f64,
    /// Ionic step number of that frame.
    pub step: u64,
}

/// Index of the value in `times` closest to `target`.
///
/// `times` must be sorted ascending (ionic steps are monotone, so trajectory
/// timelines always are). The later entry wins only when it is strictly
/// closer; an exact halfway tie resolves to the earlier one.
pub fn nearest_index(times: &[f64], target: f64) -> Option<usize> {
    if times.is_empty() {
        return None;
    }
    match times.binary_search_by(|t| t.total_cmp(&target)) {
        Ok(found) => Some(found),
        Err(0) => Some(0),
        Err(insert) if insert == times.len() => Some(times.len() - 1),
        Err(insert) => {
            let below = target - times[insert - 1];
            let above = times[insert] - target;
            if above < below {
                Some(insert)
            } else {
                Some(insert - 1)
            }
        }
    }
}

/// Maps each requested simulation time to the nearest trajectory frame.
///
/// # Errors
///
/// Fails on an empty trajectory or a non-positive POTIM; an out-of-range
/// request is not an error, it simply clamps to the first or last frame.
#[instrument(level = "debug", skip(trajectory), fields(frames = trajectory.frames.len()))]
pub fn select_frames(
    trajectory: &Trajectory,
    potim_fs: f64,
    requested_ps: &[f64],
) -> Result<Vec<SnapshotSelection>, SnapshotError> {
    if !(potim_fs > 0.0) {
        return Err(SnapshotError::InvalidTimeStep(potim_fs));
    }
    let times = trajectory.times_ps(potim_fs);
    requested_ps
        .iter()
        .map(|&requested| {
            let frame_index =
                nearest_index(&times, requested).ok_or(SnapshotError::EmptyTrajectory)?;
            Ok(SnapshotSelection {
                requested_ps: requested,
                frame_index,
                actual_ps: times[frame_index],
                step: trajectory.frames[frame_index].step,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::xdatcar::XdatcarFile;
    use std::io::BufReader;

    #[test]
    fn nearest_index_finds_exact_matches() {
        let times = [0.5, 1.0, 1.5, 2.0];
        assert_eq!(nearest_index(&times, 1.5), Some(2));
    }

    #[test]
    fn nearest_index_picks_the_closest_value() {
        let times = [0.5, 1.0, 1.5, 2.0];
        assert_eq!(nearest_index(&times, 1.1), Some(1));
        assert_eq!(nearest_index(&times, 1.4), Some(2));
    }

    #[test]
    fn nearest_index_breaks_exact_ties_toward_the_earlier_frame() {
        let times = [1.0, 2.0];
        assert_eq!(nearest_index(&times, 1.5), Some(0));
        // The later frame needs to be strictly closer to win.
        assert_eq!(nearest_index(&times, 1.5 + 1e-9), Some(1));
    }

    #[test]
    fn nearest_index_clamps_out_of_range_targets() {
        let times = [0.5, 1.0, 1.5];
        assert_eq!(nearest_index(&times, -3.0), Some(0));
        assert_eq!(nearest_index(&times, 99.0), Some(2));
    }

    #[test]
    fn nearest_index_on_empty_slice_is_none() {
        assert_eq!(nearest_index(&[], 1.0), None);
    }

    fn trajectory() -> Trajectory {
        let text = "\
aimd
1.0
3.0 0.0 0.0
0.0 3.0 0.0
0.0 0.0 3.0
A
1
Direct configuration=     1
  0.0 0.0 0.0
Direct configuration=     2
  0.1 0.0 0.0
Direct configuration=     3
  0.2 0.0 0.0
";
        XdatcarFile::read_from(&mut BufReader::new(text.as_bytes())).unwrap()
    }

    #[test]
    fn select_frames_maps_times_to_ionic_steps() {
        // POTIM 500 fs: frames at 0.5, 1.0, 1.5 ps.
        let selections = select_frames(&trajectory(), 500.0, &[0.6, 1.5]).unwrap();
        assert_eq!(selections.len(), 2);
        assert_eq!(selections[0].frame_index, 0);
        assert_eq!(selections[0].step, 1);
        assert_eq!(selections[1].frame_index, 2);
        assert!((selections[1].actual_ps - 1.5).abs() < 1e-12);
    }

    #[test]
    fn select_frames_rejects_non_positive_potim() {
        assert_eq!(
            select_frames(&trajectory(), 0.0, &[1.0]),
            Err(SnapshotError::InvalidTimeStep(0.0))
        );
    }
}

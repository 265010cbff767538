// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unmatched-line detection, sliding-window shingling, and window-overlap
//! merging for the line-matching pass.

mod merge;
mod ranges;
mod windowing;

pub use merge::merge_window_groups;
pub use ranges::{matched_lines, unmatched_ranges};
pub use windowing::{make_windows, ShingleWindow, WindowConfig};

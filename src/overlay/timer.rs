// Copyright (C) 2025 Joshua Kesler
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use chrono::NaiveTime;
use std::time::Instant;

/// 1 Hz counter anchored at the moment recording began.
///
/// Ticks are derived from the anchor rather than accumulated, so a late
/// frame catches up without drifting and polling twice never double counts.
#[derive(Debug, Clone, Copy)]
pub struct ElapsedTimer {
    started: Instant,
    ticks: u64
}

impl ElapsedTimer {
    pub fn start(now: Instant) -> Self {
        Self { started: now, ticks: 0 }
    }

    /// Returns the number of whole seconds that elapsed since the last poll.
    pub fn poll(&mut self, now: Instant) -> u64 {
        let due = now.saturating_duration_since(self.started).as_secs();
        let fresh = due.saturating_sub(self.ticks);
        self.ticks = self.ticks.max(due);
        fresh
    }
}

/// Formats `seconds` as `mm:ss` of a clock starting at midnight.
pub fn format_elapsed(seconds: u64) -> String {
    let of_day = (seconds % 86_400) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(of_day, 0)
        .map(|t| t.format("%M:%S").to_string())
        .unwrap_or_else(|| String::from("00:00"))
}

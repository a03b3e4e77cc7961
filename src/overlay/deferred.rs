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

use std::collections::VecDeque;

/// Work postponed until the current frame's input handling is done.
///
/// Tasks run once, in submission order. Anything pushed while a batch is
/// running waits for the next batch.
#[derive(Debug)]
pub struct DeferredQueue<T> {
    tasks: VecDeque<T>
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self { tasks: VecDeque::new() }
    }
}

impl<T> DeferredQueue<T> {
    pub fn push(&mut self, task: T) {
        self.tasks.push_back(task);
    }

    pub fn take_batch(&mut self) -> VecDeque<T> {
        std::mem::take(&mut self.tasks)
    }

    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.tasks.retain(keep);
    }
}

// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod accumulator;
pub mod frame;
pub mod pass;
pub mod random_state;
pub mod target;

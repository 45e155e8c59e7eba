// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod loader;
pub mod report;
#[allow(clippy::module_inception)]
pub mod session;

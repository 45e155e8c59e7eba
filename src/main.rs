// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::env;

use anyhow::Result;

fn main() -> Result<()> {
    env_logger::init();
    progressive_tracer::app::run(env::args().nth(1))
}

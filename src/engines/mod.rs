// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod cdp_engine;
pub mod driver;
pub mod headless_chrome_engine;
pub mod idle;
pub mod router;
pub mod traits;

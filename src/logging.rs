/*
 * ==========================================================================
 * A metacircular, continuation-passing-style interpreter core.
 * ==========================================================================
 *
 * License:
 * This file is part of the interpreter project.
 *
 * Dual-licensed under the terms of:
 *   - The MIT license
 *   - The Apache License, Version 2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under these licenses is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *
 * ==========================================================================
 */

//! Optional `tracing` wiring for embedders that want the
//! [`crate::interceptor::TracingInterceptor`]'s `trace!` spans to actually go
//! somewhere. This crate never installs a global subscriber on its own —
//! only a binary's `main` gets to decide that — so `init_tracing` is offered
//! as a convenience for tests, benches, and example binaries, not called
//! from anywhere in the library itself.

use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber reading its filter from `RUST_LOG`, falling
/// back to `info` when unset. Safe to call more than once — later calls are
/// a no-op if a global subscriber is already installed.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}

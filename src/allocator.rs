//! Memory allocator configuration.
//!
//! The binary uses mimalloc instead of the system allocator: encryption
//! sessions churn through many short-lived buffers, and mimalloc's
//! randomized allocation patterns are a better fit for a security-sensitive
//! workload than glibc malloc.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

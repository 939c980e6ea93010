mod batching_case1;
mod configured_container;
mod concurrent_writers;

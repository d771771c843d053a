// ─── modup Core ───
// Pipeline for checking and applying Minecraft mod updates.
//
// Architecture:
//   core/
//     scanner    - mods directory listing + file-name heuristics
//     loader     - mod loader detection (Forge, Fabric, Quilt, NeoForge)
//     platform/  - CurseForge + Modrinth REST clients behind one trait
//     matcher    - local mod to remote project resolution with fallback
//     resolver   - best candidate selection per target game version
//     downloader - streaming downloads with SHA-1 validation
//     applier    - backup/trash relocation + install of the new build
//     pipeline   - bounded-concurrency orchestration, scan-order reports
//     report     - per-mod match results and the run summary

pub mod applier;
pub mod config;
pub mod downloader;
pub mod error;
pub mod http;
pub mod loader;
pub mod matcher;
pub mod pipeline;
pub mod platform;
pub mod report;
pub mod resolver;
pub mod scanner;

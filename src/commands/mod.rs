/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `metrics` - Compute and print engagement metrics
- `history` - List, show, delete, import and export stored sessions
- `presets` - Print the preset conversation starters

Handlers take the loaded configuration and print to stdout; storage and
metrics logic live in the library modules they call.
*/

// Engagement metrics report
pub mod metrics;

// Stored session management
pub mod history;

// Preset prompt listing
pub mod presets;

//! V8 debugger protocol requests as accepted by the eventing debug bridge.
//!
//! A request on the wire is `{seq, type: "request", command, arguments}`.
//! `listbreakpoints` is the one command sent without an `arguments` key.

pub mod client;
pub mod script;

use serde::{Deserialize, Serialize};

pub use client::{DebugClient, DebugEndpoint, DebugError};
pub use script::{Scenario, ScenarioConfig, Step};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinueArgs {
    pub stepaction: String,
    pub stepcount: u32,
}

impl Default for ContinueArgs {
    fn default() -> Self {
        Self {
            stepaction: "next".to_string(),
            stepcount: 1,
        }
    }
}

/// Extra named handle passed along with an evaluate request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextHandle {
    pub name: String,
    pub handle: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateArgs {
    pub expression: String,
    pub global: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_break: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_context: Vec<ContextHandle>,
}

impl Default for EvaluateArgs {
    fn default() -> Self {
        Self::global("v1")
    }
}

impl EvaluateArgs {
    pub fn global(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            global: true,
            disable_break: None,
            additional_context: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupArgs {
    pub handles: Vec<String>,
    pub include_source: bool,
}

impl Default for LookupArgs {
    fn default() -> Self {
        Self {
            handles: vec!["meta".to_string()],
            include_source: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktraceArgs {
    pub from_frame: u32,
    pub to_frame: u32,
    pub bottom: bool,
}

impl Default for BacktraceArgs {
    fn default() -> Self {
        Self {
            from_frame: 0,
            to_frame: 1,
            bottom: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameArgs {
    pub number: u32,
}

impl Default for FrameArgs {
    fn default() -> Self {
        Self { number: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceArgs {
    pub frame: u32,
    pub from_line: u32,
    pub to_line: u32,
}

impl Default for SourceArgs {
    fn default() -> Self {
        Self {
            frame: 2,
            from_line: 10,
            to_line: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetBreakpointArgs {
    #[serde(rename = "type")]
    pub kind: String,
    pub target: String,
    pub line: u32,
}

impl Default for SetBreakpointArgs {
    fn default() -> Self {
        Self {
            kind: "function".to_string(),
            target: "OnUpdate".to_string(),
            line: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearBreakpointArgs {
    #[serde(rename = "type")]
    pub kind: String,
    /// Number of breakpoints to clear
    pub breakpoint: u32,
}

impl Default for ClearBreakpointArgs {
    fn default() -> Self {
        Self {
            kind: "function".to_string(),
            breakpoint: 1,
        }
    }
}

/// One debugger command with its arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "arguments", rename_all = "lowercase")]
pub enum DebugCommand {
    Continue(ContinueArgs),
    Evaluate(EvaluateArgs),
    Lookup(LookupArgs),
    Backtrace(BacktraceArgs),
    Frame(FrameArgs),
    Source(SourceArgs),
    SetBreakpoint(SetBreakpointArgs),
    ClearBreakpoint(ClearBreakpointArgs),
    ListBreakpoints,
}

impl DebugCommand {
    /// Every command kind with the arguments the driver sends by default
    pub fn all() -> Vec<DebugCommand> {
        vec![
            DebugCommand::Continue(ContinueArgs::default()),
            DebugCommand::Evaluate(EvaluateArgs::default()),
            DebugCommand::Lookup(LookupArgs::default()),
            DebugCommand::Backtrace(BacktraceArgs::default()),
            DebugCommand::Frame(FrameArgs::default()),
            DebugCommand::Source(SourceArgs::default()),
            DebugCommand::SetBreakpoint(SetBreakpointArgs::default()),
            DebugCommand::ClearBreakpoint(ClearBreakpointArgs::default()),
            DebugCommand::ListBreakpoints,
        ]
    }

    /// Wire name, used both in the body and in the `command` query parameter
    pub fn name(&self) -> &'static str {
        match self {
            DebugCommand::Continue(_) => "continue",
            DebugCommand::Evaluate(_) => "evaluate",
            DebugCommand::Lookup(_) => "lookup",
            DebugCommand::Backtrace(_) => "backtrace",
            DebugCommand::Frame(_) => "frame",
            DebugCommand::Source(_) => "source",
            DebugCommand::SetBreakpoint(_) => "setbreakpoint",
            DebugCommand::ClearBreakpoint(_) => "clearbreakpoint",
            DebugCommand::ListBreakpoints => "listbreakpoints",
        }
    }

    /// Prefix printed in front of the response body
    pub fn label(&self) -> &'static str {
        match self {
            DebugCommand::Continue(_) => "Continue call",
            DebugCommand::Evaluate(_) => "Evaluate call",
            DebugCommand::Lookup(_) => "Lookup call",
            DebugCommand::Backtrace(_) => "Backtrace call",
            DebugCommand::Frame(_) => "Frame call",
            DebugCommand::Source(_) => "Source call",
            DebugCommand::SetBreakpoint(_) => "setbreakpoint",
            DebugCommand::ClearBreakpoint(_) => "clearbreakpoint call",
            DebugCommand::ListBreakpoints => "listbreakpoints call",
        }
    }

    /// Whether the outgoing body is worth showing at the default log level.
    /// Only evaluate carries user-chosen input.
    pub fn echoes_request(&self) -> bool {
        matches!(self, DebugCommand::Evaluate(_))
    }

    /// Full request body for sequence number `seq`
    pub fn to_request(&self, seq: u64) -> Result<serde_json::Value, serde_json::Error> {
        let mut body = serde_json::to_value(self)?;
        if let Some(map) = body.as_object_mut() {
            map.insert("seq".to_string(), seq.into());
            map.insert("type".to_string(), "request".into());
        }
        Ok(body)
    }
}

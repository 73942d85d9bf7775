//! Tool change handling
//!
//! Runs when the tool number changes between two sections and tool changes
//! are enabled. Either the built-in park-and-prompt sequence or the external
//! tool-change code is written, never both.

use marlinpost_core::Tool;
use marlinpost_settings::ToolChangeSequence;
use tracing::debug;

use crate::context::JobContext;

impl JobContext {
    /// Write the tool-change sequence for `tool`
    pub fn tool_change(&mut self, tool: &Tool) {
        debug!(
            "Tool change from {:?} to T{}",
            self.machine.tool, tool.number
        );

        match self.properties.tool_change.sequence() {
            ToolChangeSequence::External(code) => self.external_tool_change(&code),
            ToolChangeSequence::BuiltIn => self.builtin_tool_change(tool),
        }

        // the operator may have moved the machine by hand
        self.modals.reset_motion();
    }

    fn external_tool_change(&mut self, code: &str) {
        for line in code.lines() {
            self.writer.write_raw(line);
        }
    }

    fn builtin_tool_change(&mut self, tool: &Tool) {
        let settings = self.properties.tool_change.clone();

        self.comment(&format!("Tool change to T{}", tool.number));
        // drain the motion buffer, then beep
        self.writer.write_block(&["M400"]);
        self.writer.write_block(&["M300", "S400", "P2000"]);

        self.modals.reset_motion();
        self.rapid(Some(settings.x), Some(settings.y), Some(settings.z));

        if settings.disable_z_stepper {
            self.writer.write_block(&["M18", "Z"]);
        }

        let prompt = if tool.name.is_empty() {
            format!("Put tool {}", tool.number)
        } else {
            format!("Put tool {} - {}", tool.number, tool.name)
        };
        let prompt = crate::writer::strip_comment_text(&prompt);
        self.writer.write_block(&["M0", prompt.as_str()]);

        if settings.probe_after_change {
            self.probe_tool(tool);
        }

        self.comment("---");
    }

    /// Tool length probing hook; Marlin probing is not generated yet
    pub fn probe_tool(&mut self, tool: &Tool) {
        debug!("Z probe requested for T{}", tool.number);
        self.comment(&format!("Probe Z for T{} - not yet implemented", tool.number));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marlinpost_core::ToolType;
    use marlinpost_settings::PostProperties;

    fn properties() -> PostProperties {
        let mut p = PostProperties::default();
        p.tool_change.enabled = true;
        p.tool_change.x = 10.0;
        p.tool_change.y = 20.0;
        p.tool_change.z = 40.0;
        p
    }

    #[test]
    fn test_builtin_sequence() {
        let mut ctx = JobContext::new(properties());
        let tool = Tool::new(2, "3mm (flat)", ToolType::EndMillFlat, 3.0);
        ctx.tool_change(&tool);

        let out: Vec<&str> = ctx.writer.as_str().lines().collect();
        assert_eq!(
            out,
            vec![
                "; Tool change to T2",
                "M400",
                "M300 S400 P2000",
                "G1 Z40.000 F300",
                "G1 X10.000 Y20.000 F2500",
                "M18 Z",
                "M0 Put tool 2 - 3mm flat",
                "; ---",
            ]
        );
        assert_eq!(ctx.modals.z.last(), None);
    }

    #[test]
    fn test_builtin_sequence_with_probe_and_z_enabled() {
        let mut p = properties();
        p.tool_change.disable_z_stepper = false;
        p.tool_change.probe_after_change = true;
        let mut ctx = JobContext::new(p);
        ctx.tool_change(&Tool::new(5, "", ToolType::Drill, 2.0));

        let text = ctx.writer.as_str();
        assert!(!text.contains("M18"));
        assert!(text.contains("M0 Put tool 5\n"));
        assert!(text.contains("; Probe Z for T5 - not yet implemented"));
    }

    #[test]
    fn test_external_sequence_replaces_builtin() {
        let mut p = properties();
        p.tool_change.external_code = Some("M400\nM0 Swap tool now\n".to_string());
        let mut ctx = JobContext::new(p);
        ctx.tool_change(&Tool::new(3, "ball", ToolType::EndMillBall, 6.0));

        assert_eq!(ctx.writer.as_str(), "M400\nM0 Swap tool now\n");
    }
}

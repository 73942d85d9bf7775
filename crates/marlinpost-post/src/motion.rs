//! Motion translation
//!
//! Maps motion, power, dwell and spindle events onto Marlin blocks. Marlin
//! has no feed-independent rapid mode, so rapids become G1 moves at the
//! configured travel speeds, and it only runs arcs in the XY plane.

use marlinpost_core::{Plane, Point3, PostError, PostResult};
use tracing::{debug, warn};

use crate::context::JobContext;
use crate::format::NumberFormat;

const LINEAR: f64 = 1.0;
const ARC_CW: f64 = 2.0;
const ARC_CCW: f64 = 3.0;

/// Z differences below this are treated as a planar arc
const HELIX_EPSILON: f64 = 1e-6;

impl JobContext {
    /// Positioning move: Z first at the Z travel speed, then XY at the XY
    /// travel speed. Either block is left out when its axes did not change.
    pub fn rapid(&mut self, x: Option<f64>, y: Option<f64>, z: Option<f64>) {
        if let Some(z_word) = self.modals.z.format_opt(z) {
            let z_speed = self.properties.travel.z_speed;
            self.modals.feed.reset();
            let words = [
                self.modals.motion.format(LINEAR),
                Some(z_word),
                self.modals.feed.format(z_speed),
            ];
            self.writer.write_words(&words);
        }

        let x_word = self.modals.x.format_opt(x);
        let y_word = self.modals.y.format_opt(y);
        if x_word.is_some() || y_word.is_some() {
            let xy_speed = self.properties.travel.xy_speed;
            self.modals.feed.reset();
            let words = [
                self.modals.motion.format(LINEAR),
                x_word,
                y_word,
                self.modals.feed.format(xy_speed),
            ];
            self.writer.write_words(&words);
        }

        let position = &mut self.machine.position;
        position.x = x.unwrap_or(position.x);
        position.y = y.unwrap_or(position.y);
        position.z = z.unwrap_or(position.z);
    }

    /// Cutting move; nothing is written when no axis changed
    pub fn linear(&mut self, x: f64, y: f64, z: f64, feed: f64) {
        let x_word = self.modals.x.format(x);
        let y_word = self.modals.y.format(y);
        let z_word = self.modals.z.format(z);
        self.machine.position = Point3::new(x, y, z);

        if x_word.is_none() && y_word.is_none() && z_word.is_none() {
            return;
        }

        let words = [
            self.modals.motion.format(LINEAR),
            x_word,
            y_word,
            z_word,
            self.modals.feed.format(feed),
        ];
        self.writer.write_words(&words);
    }

    /// Circular move around `center`, ending at `end`
    ///
    /// I and J are offsets from the position before the move. Arcs outside
    /// the XY plane, and helices, are linearized within the arc tolerance.
    pub fn circular(
        &mut self,
        clockwise: bool,
        center: Point3,
        end: Point3,
        feed: f64,
        plane: Plane,
    ) {
        let start = self.machine.position;

        if plane != Plane::XY || (end.z - start.z).abs() > HELIX_EPSILON {
            let points = self
                .arcs
                .expand_arc(start, end, center, clockwise, plane);
            debug!(
                "Linearizing {} arc into {} segments",
                plane,
                points.len()
            );
            for p in points {
                self.linear(p.x, p.y, p.z, feed);
            }
            return;
        }

        if let Some(plane_word) = self.modals.plane.format(f64::from(Plane::XY.gcode())) {
            self.writer.write_block(&[plane_word]);
        }

        let motion = if clockwise { ARC_CW } else { ARC_CCW };
        let words = [
            self.modals.motion.format(motion),
            self.modals.x.format(end.x),
            self.modals.y.format(end.y),
            Some(self.modals.i.format(center.x - start.x)),
            Some(self.modals.j.format(center.y - start.y)),
            self.modals.feed.format(feed),
        ];
        self.writer.write_words(&words);
        self.machine.position = end;
    }

    /// Rotary axes are not supported
    pub fn rapid_5d(&mut self) -> PostResult<()> {
        Err(PostError::unsupported(
            "multi-axis rapid motion; this post drives 3 linear axes only",
        ))
    }

    /// Rotary axes are not supported
    pub fn linear_5d(&mut self) -> PostResult<()> {
        Err(PostError::unsupported(
            "multi-axis linear motion; this post drives 3 linear axes only",
        ))
    }

    /// Cutter power; repeating the current state writes nothing
    pub fn power(&mut self, on: bool) {
        if self.machine.power_on == on {
            return;
        }
        self.machine.power_on = on;

        if on {
            match self.machine.cutter_on_command.clone() {
                Some(command) => self.write_command(&command),
                None => warn!("Power on requested without a cutter-on command for this section"),
            }
        } else {
            let command = self.properties.cutter.off.clone();
            self.write_command(&command);
        }
    }

    /// Pause for `seconds`
    pub fn dwell(&mut self, seconds: f64) {
        let seconds_word = NumberFormat::seconds().word(seconds);
        self.comment(&format!("Dwell {} seconds", NumberFormat::new("", 3).number(seconds)));
        self.writer.write_block(&["G4", seconds_word.as_str()]);
    }

    /// Spindle speed, always written
    pub fn spindle_speed(&mut self, rpm: f64) {
        let words = [self.modals.speed.format(rpm)];
        self.writer.write_words(&words);
    }
}

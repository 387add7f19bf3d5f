use super::walker::{GraphWalker, StatementEmitter};
use super::writer::{SourceWriter, java_ident, num};
use super::{CodeBackend, DeviceUsage, condition_text, mechanism_statement};
use crate::device::{DeviceRegistry, DriveKind, DrivetrainConfig};
use crate::error::CodegenError;
use crate::routine::{ActionKind, ProgramGraph};
use crate::sim::{DEFAULT_ANGLE_DEG, DEFAULT_DISTANCE_IN, Pose, apply_movement};

/// Assumed straight-line speed of the open-loop drivetrain.
const LINEAR_SPEED_IN_PER_S: f64 = 24.0;
/// Milliseconds to rotate 90 degrees at turn power.
const MS_PER_90_DEG: f64 = 800.0;
const DRIVE_POWER: f64 = 0.5;

/// The open-loop, time-based target: every movement becomes motor-power
/// assignments plus a `sleep` computed from a fixed robot speed. No feedback.
pub struct SimpleBackend;

impl CodeBackend for SimpleBackend {
    fn target_name(&self) -> &'static str {
        "simple"
    }

    fn class_name(&self) -> &'static str {
        "SimpleTimeAuto"
    }

    fn generate(
        &self,
        graph: &ProgramGraph,
        waypoints: &[Pose],
        devices: &DeviceRegistry,
    ) -> Result<String, CodegenError> {
        let usage = DeviceUsage::analyze(graph, devices);
        let drivetrain = devices.drivetrain();
        let initial = waypoints.first().copied().unwrap_or(Pose::new(0.0, 0.0, 0.0));

        let mut emitter = SimpleEmitter {
            w: SourceWriter::new(),
            pose: initial,
            drivetrain: drivetrain.clone(),
            loop_depth: 0,
        };
        GraphWalker::new(graph).lower(&mut emitter)?;
        let body = emitter.w.finish();

        let mut w = SourceWriter::new();
        w.line("/*");
        w.line(" * Generated autonomous routine - Simple (time-based) target.");
        w.line(" * Open-loop driving: distances and turns are approximated by powering");
        w.line(" * the drivetrain for a computed duration.");
        w.line(" */");
        w.line("package org.firstinspires.ftc.teamcode;");
        w.blank();
        w.line("import com.qualcomm.robotcore.eventloop.opmode.Autonomous;");
        w.line("import com.qualcomm.robotcore.eventloop.opmode.LinearOpMode;");
        super::hardware_imports(&mut w, &usage, usage.has_movement);
        w.blank();
        w.line(format!(
            "@Autonomous(name = \"{}\", group = \"Generated\")",
            self.class_name()
        ));
        w.open(format!("public class {} extends LinearOpMode", self.class_name()));
        w.blank();

        let wheels = wheel_idents(&drivetrain);
        if usage.has_movement {
            for wheel in &wheels {
                w.line(format!("private DcMotor {};", wheel));
            }
        }
        super::declare_mechanism_fields(&mut w, &usage);
        w.blank();

        w.line("@Override");
        w.open("public void runOpMode()");
        if usage.has_movement {
            for (wheel, name) in wheels.iter().zip(drive_motor_names(&drivetrain)) {
                w.line(format!(
                    "{} = hardwareMap.get(DcMotor.class, \"{}\");",
                    wheel, name
                ));
            }
            // Left side counter-rotates on a standard chassis.
            for wheel in left_side(&wheels, &drivetrain) {
                w.line(format!("{}.setDirection(DcMotor.Direction.REVERSE);", wheel));
            }
        }
        super::map_mechanism_hardware(&mut w, &usage);
        w.blank();
        w.line("telemetry.addData(\"Status\", \"Initialized\");");
        w.line("telemetry.update();");
        w.line("waitForStart();");
        w.open("if (isStopRequested())");
        w.line("return;");
        w.close();
        w.blank();
        w.lines(&body);
        if usage.has_movement {
            w.blank();
            w.line("stopDrive();");
        }
        w.close();

        if usage.has_movement {
            w.blank();
            emit_drive_helpers(&mut w, &drivetrain);
        }
        w.close();

        Ok(w.finish())
    }
}

struct SimpleEmitter {
    w: SourceWriter,
    pose: Pose,
    drivetrain: DrivetrainConfig,
    loop_depth: usize,
}

impl SimpleEmitter {
    fn drive_for(&mut self, label: &str, powers: &[f64], millis: f64) {
        self.w.line(format!("// {}", label));
        let joined = powers.iter().map(|p| num(*p)).collect::<Vec<_>>().join(", ");
        self.w.line(format!("setDrivePower({});", joined));
        self.w.line(format!("sleep({});", millis.round().max(0.0) as i64));
        self.w.line("stopDrive();");
    }

    fn straight(&mut self, label: &str, distance: f64, sign: f64) {
        let power = sign * DRIVE_POWER;
        let powers = match self.drivetrain.kind {
            DriveKind::Mecanum => vec![power, power, power, power],
            DriveKind::Differential => vec![power, power],
        };
        self.drive_for(label, &powers, distance / LINEAR_SPEED_IN_PER_S * 1000.0);
    }

    fn strafe(&mut self, label: &str, distance: f64, left: bool) {
        match self.drivetrain.kind {
            DriveKind::Mecanum => {
                let s = if left { -DRIVE_POWER } else { DRIVE_POWER };
                self.drive_for(
                    label,
                    &[s, -s, -s, s],
                    distance / LINEAR_SPEED_IN_PER_S * 1000.0,
                );
            }
            DriveKind::Differential => {
                self.w
                    .line(format!("// {} skipped: differential drivetrain cannot strafe", label));
            }
        }
    }

    /// Positive delta turns right (heading increases), negative turns left.
    fn turn_by(&mut self, label: &str, delta_deg: f64) {
        if delta_deg.abs() < f64::EPSILON {
            return;
        }
        // Turning right: left side forward, right side backward.
        let p = if delta_deg > 0.0 { DRIVE_POWER } else { -DRIVE_POWER };
        let powers = match self.drivetrain.kind {
            DriveKind::Mecanum => vec![p, -p, p, -p],
            DriveKind::Differential => vec![p, -p],
        };
        let millis = delta_deg.abs() / 90.0 * MS_PER_90_DEG;
        self.drive_for(label, &powers, millis);
    }

    fn move_to(&mut self, target: Pose, label: &str) {
        let dx = target.x - self.pose.x;
        let dy = target.y - self.pose.y;
        let distance = (dx * dx + dy * dy).sqrt();
        self.w.line(format!(
            "// {} ({}, {}) @ {} deg",
            label,
            num(target.x),
            num(target.y),
            num(target.heading)
        ));
        if distance > f64::EPSILON {
            let travel = dy.atan2(dx).to_degrees();
            self.turn_by("face travel direction", travel - self.pose.heading);
            self.straight("drive to target", distance, 1.0);
            self.turn_by("settle on target heading", target.heading - travel);
        } else {
            self.turn_by("settle on target heading", target.heading - self.pose.heading);
        }
    }
}

impl StatementEmitter for SimpleEmitter {
    fn emit_action(&mut self, action: &ActionKind, combined: Option<&ActionKind>) {
        if let Some(combined) = combined {
            self.w.line("// combined action");
            mechanism_statement(&mut self.w, combined, true);
        }

        match action {
            ActionKind::Forward { distance } => {
                let d = distance.unwrap_or(DEFAULT_DISTANCE_IN);
                self.straight(&format!("forward {} in", num(d)), d, 1.0);
            }
            ActionKind::Backward { distance } => {
                let d = distance.unwrap_or(DEFAULT_DISTANCE_IN);
                self.straight(&format!("backward {} in", num(d)), d, -1.0);
            }
            ActionKind::StrafeLeft { distance } => {
                let d = distance.unwrap_or(DEFAULT_DISTANCE_IN);
                self.strafe(&format!("strafe left {} in", num(d)), d, true);
            }
            ActionKind::StrafeRight { distance } => {
                let d = distance.unwrap_or(DEFAULT_DISTANCE_IN);
                self.strafe(&format!("strafe right {} in", num(d)), d, false);
            }
            ActionKind::TurnLeft { angle } => {
                let a = angle.unwrap_or(DEFAULT_ANGLE_DEG);
                self.turn_by(&format!("turn left {} deg", num(a)), -a);
            }
            ActionKind::TurnRight { angle } => {
                let a = angle.unwrap_or(DEFAULT_ANGLE_DEG);
                self.turn_by(&format!("turn right {} deg", num(a)), a);
            }
            ActionKind::TurnToHeading { heading } => {
                self.turn_by(
                    &format!("turn to heading {} deg", num(*heading)),
                    heading - self.pose.heading,
                );
            }
            ActionKind::MoveToPosition { .. } => {
                if let Some(target) = apply_movement(action, self.pose) {
                    self.move_to(target, "move to position");
                }
            }
            ActionKind::SplineTo { .. } => {
                if let Some(target) = apply_movement(action, self.pose) {
                    self.move_to(target, "spline approximated as line to");
                }
            }
            other => mechanism_statement(&mut self.w, other, true),
        }

        if let Some(next) = apply_movement(action, self.pose) {
            self.pose = next;
        }
    }

    fn begin_conditional(&mut self, condition: &str) {
        self.w.open(format!("if ({})", condition_text(condition)));
    }

    fn begin_else(&mut self) {
        self.w.dedent();
        self.w.line("} else {");
        self.w.indent();
    }

    fn end_conditional(&mut self) {
        self.w.close();
    }

    fn begin_loop(&mut self, count: u32, iterator: Option<&str>) {
        let var = loop_var(self.loop_depth, iterator);
        self.loop_depth += 1;
        self.w.open(format!(
            "for (int {v} = 0; {v} < {c}; {v}++)",
            v = var,
            c = count
        ));
    }

    fn end_loop(&mut self) {
        self.loop_depth = self.loop_depth.saturating_sub(1);
        self.w.close();
    }

    fn begin_parallel(&mut self) {
        self.w
            .line("// parallel block: branches run sequentially in this target");
    }

    fn parallel_branch(&mut self, index: u8) {
        self.w.line(format!("// parallel branch {}", index));
    }

    fn end_parallel(&mut self) {}

    fn emit_cycle_guard(&mut self, node_id: &str) {
        self.w
            .line(format!("// cycle detected at node '{}'; branch halted", node_id));
    }
}

/// Loop variable names for nested generated loops.
pub(super) fn loop_var(depth: usize, iterator: Option<&str>) -> String {
    match iterator {
        Some(name) if !name.trim().is_empty() => java_ident(name),
        _ => {
            const NAMES: [&str; 5] = ["i", "j", "k", "m", "n"];
            NAMES[depth % NAMES.len()].to_string()
        }
    }
}

/// Field identifiers for the drivetrain wheels, in helper-argument order.
pub(super) fn wheel_idents(drivetrain: &DrivetrainConfig) -> Vec<String> {
    drive_motor_names(drivetrain)
        .iter()
        .map(|n| java_ident(n))
        .collect()
}

/// Hardware-map names for the drivetrain wheels, padded with stock names
/// when the configuration is incomplete.
pub(super) fn drive_motor_names(drivetrain: &DrivetrainConfig) -> Vec<String> {
    let defaults: &[&str] = match drivetrain.kind {
        DriveKind::Mecanum => &["leftFront", "rightFront", "leftRear", "rightRear"],
        DriveKind::Differential => &["leftDrive", "rightDrive"],
    };
    defaults
        .iter()
        .enumerate()
        .map(|(i, default)| {
            drivetrain
                .motors
                .get(i)
                .filter(|n| !n.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| default.to_string())
        })
        .collect()
}

/// The wheels on the left side of the chassis (indices 0 and 2 for mecanum,
/// 0 for differential).
fn left_side<'a>(wheels: &'a [String], drivetrain: &DrivetrainConfig) -> Vec<&'a String> {
    match drivetrain.kind {
        DriveKind::Mecanum => vec![&wheels[0], &wheels[2]],
        DriveKind::Differential => vec![&wheels[0]],
    }
}

fn emit_drive_helpers(w: &mut SourceWriter, drivetrain: &DrivetrainConfig) {
    let wheels = wheel_idents(drivetrain);
    let params = wheels
        .iter()
        .map(|i| format!("double {}Power", i))
        .collect::<Vec<_>>()
        .join(", ");
    w.open(format!("private void setDrivePower({})", params));
    for wheel in &wheels {
        w.line(format!("{w}.setPower({w}Power);", w = wheel));
    }
    w.close();
    w.blank();
    w.open("private void stopDrive()");
    for wheel in &wheels {
        w.line(format!("{}.setPower(0);", wheel));
    }
    w.close();
}

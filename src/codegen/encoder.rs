use super::simple::{drive_motor_names, loop_var, wheel_idents};
use super::walker::{GraphWalker, StatementEmitter};
use super::writer::{SourceWriter, num};
use super::{CodeBackend, DeviceUsage, condition_text, mechanism_statement};
use crate::device::{DeviceRegistry, DriveKind, DrivetrainConfig};
use crate::error::CodegenError;
use crate::routine::{ActionKind, ProgramGraph};
use crate::sim::{DEFAULT_ANGLE_DEG, DEFAULT_DISTANCE_IN, Pose, apply_movement};

/// Assumed inches per second at `DRIVE_SPEED`, used only to size timeouts.
const TIMEOUT_SPEED_IN_PER_S: f64 = 12.0;

/// The closed-loop target: every movement becomes one `encoderDrive` call
/// with per-wheel distances from the drivetrain kinematics, and the file
/// ends with the reusable `encoderDrive` helper.
pub struct EncoderBackend;

impl CodeBackend for EncoderBackend {
    fn target_name(&self) -> &'static str {
        "encoder"
    }

    fn class_name(&self) -> &'static str {
        "EncoderAuto"
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

        let mut emitter = EncoderEmitter {
            w: SourceWriter::new(),
            pose: initial,
            drivetrain: drivetrain.clone(),
            loop_depth: 0,
        };
        GraphWalker::new(graph).lower(&mut emitter)?;
        let body = emitter.w.finish();

        let mut w = SourceWriter::new();
        w.line("/*");
        w.line(" * Generated autonomous routine - Encoder (position-based) target.");
        w.line(" * Closed-loop driving: each movement runs the wheels to encoder");
        w.line(" * targets computed from the drivetrain geometry.");
        w.line(" */");
        w.line("package org.firstinspires.ftc.teamcode;");
        w.blank();
        w.line("import com.qualcomm.robotcore.eventloop.opmode.Autonomous;");
        w.line("import com.qualcomm.robotcore.eventloop.opmode.LinearOpMode;");
        w.line("import com.qualcomm.robotcore.util.ElapsedTime;");
        super::hardware_imports(&mut w, &usage, usage.has_movement);
        w.blank();
        w.line(format!(
            "@Autonomous(name = \"{}\", group = \"Generated\")",
            self.class_name()
        ));
        w.open(format!("public class {} extends LinearOpMode", self.class_name()));
        w.blank();
        w.line(format!(
            "static final double COUNTS_PER_MOTOR_REV = {};",
            num(drivetrain.ticks_per_rev)
        ));
        w.line(format!(
            "static final double DRIVE_GEAR_REDUCTION = {};",
            num(drivetrain.gear_ratio)
        ));
        w.line(format!(
            "static final double WHEEL_DIAMETER_INCHES = {};",
            num(drivetrain.wheel_diameter_in)
        ));
        w.line("static final double COUNTS_PER_INCH =");
        w.line("        (COUNTS_PER_MOTOR_REV * DRIVE_GEAR_REDUCTION) / (WHEEL_DIAMETER_INCHES * Math.PI);");
        w.line("static final double DRIVE_SPEED = 0.60;");
        w.line("static final double TURN_SPEED = 0.50;");
        w.blank();
        w.line("private final ElapsedTime runtime = new ElapsedTime();");

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
            match drivetrain.kind {
                DriveKind::Mecanum => {
                    w.line(format!("{}.setDirection(DcMotor.Direction.REVERSE);", wheels[0]));
                    w.line(format!("{}.setDirection(DcMotor.Direction.REVERSE);", wheels[2]));
                }
                DriveKind::Differential => {
                    w.line(format!("{}.setDirection(DcMotor.Direction.REVERSE);", wheels[0]));
                }
            }
            w.blank();
            for wheel in &wheels {
                w.line(format!(
                    "{}.setMode(DcMotor.RunMode.STOP_AND_RESET_ENCODER);",
                    wheel
                ));
            }
            for wheel in &wheels {
                w.line(format!(
                    "{}.setMode(DcMotor.RunMode.RUN_USING_ENCODER);",
                    wheel
                ));
            }
        }
        super::map_mechanism_hardware(&mut w, &usage);
        w.blank();
        w.line("telemetry.addData(\"Status\", \"Ready to run\");");
        w.line("telemetry.update();");
        w.line("waitForStart();");
        w.open("if (isStopRequested())");
        w.line("return;");
        w.close();
        w.blank();
        w.lines(&body);
        w.close();

        if usage.has_movement {
            w.blank();
            emit_encoder_drive(&mut w, &drivetrain);
        }
        w.close();

        Ok(w.finish())
    }
}

struct EncoderEmitter {
    w: SourceWriter,
    pose: Pose,
    drivetrain: DrivetrainConfig,
    loop_depth: usize,
}

impl EncoderEmitter {
    /// Emits one `encoderDrive` call for the given per-wheel inches.
    fn encoder_drive(&mut self, label: &str, speed: &str, wheel_inches: &[f64]) {
        let max_abs = wheel_inches.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        if max_abs < f64::EPSILON {
            return;
        }
        let timeout = max_abs / TIMEOUT_SPEED_IN_PER_S + 1.0;
        let args = wheel_inches
            .iter()
            .map(|v| num(*v))
            .collect::<Vec<_>>()
            .join(", ");
        self.w.line(format!("// {}", label));
        self.w
            .line(format!("encoderDrive({}, {}, {});", speed, args, num(timeout)));
    }

    fn straight(&mut self, label: &str, distance: f64) {
        let inches = match self.drivetrain.kind {
            DriveKind::Mecanum => vec![distance; 4],
            DriveKind::Differential => vec![distance; 2],
        };
        self.encoder_drive(label, "DRIVE_SPEED", &inches);
    }

    fn strafe(&mut self, label: &str, distance: f64, left: bool) {
        match self.drivetrain.kind {
            DriveKind::Mecanum => {
                let s = if left { -distance } else { distance };
                self.encoder_drive(label, "DRIVE_SPEED", &[s, -s, -s, s]);
            }
            DriveKind::Differential => {
                self.w
                    .line(format!("// {} skipped: differential drivetrain cannot strafe", label));
            }
        }
    }

    /// Positive delta turns right (heading increases).
    fn turn_by(&mut self, label: &str, delta_deg: f64) {
        if delta_deg.abs() < f64::EPSILON {
            return;
        }
        let arc = delta_deg.to_radians() * self.drivetrain.track_width_in / 2.0;
        let inches = match self.drivetrain.kind {
            DriveKind::Mecanum => vec![arc, -arc, arc, -arc],
            DriveKind::Differential => vec![arc, -arc],
        };
        self.encoder_drive(label, "TURN_SPEED", &inches);
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
        match self.drivetrain.kind {
            DriveKind::Mecanum if distance > f64::EPSILON => {
                // Decompose the field-frame displacement into robot-frame
                // forward and strafe components.
                let h = self.pose.heading.to_radians();
                let forward = dx * h.cos() + dy * h.sin();
                let strafe = dx * (h + std::f64::consts::FRAC_PI_2).cos()
                    + dy * (h + std::f64::consts::FRAC_PI_2).sin();
                self.encoder_drive(
                    "translate",
                    "DRIVE_SPEED",
                    &[
                        forward + strafe,
                        forward - strafe,
                        forward - strafe,
                        forward + strafe,
                    ],
                );
                self.turn_by("settle on target heading", target.heading - self.pose.heading);
            }
            DriveKind::Differential if distance > f64::EPSILON => {
                let travel = dy.atan2(dx).to_degrees();
                self.turn_by("face travel direction", travel - self.pose.heading);
                self.straight("drive to target", distance);
                self.turn_by("settle on target heading", target.heading - travel);
            }
            _ => {
                self.turn_by("settle on target heading", target.heading - self.pose.heading);
            }
        }
    }
}

impl StatementEmitter for EncoderEmitter {
    fn emit_action(&mut self, action: &ActionKind, combined: Option<&ActionKind>) {
        if let Some(combined) = combined {
            self.w.line("// combined action");
            mechanism_statement(&mut self.w, combined, true);
        }

        match action {
            ActionKind::Forward { distance } => {
                let d = distance.unwrap_or(DEFAULT_DISTANCE_IN);
                self.straight(&format!("forward {} in", num(d)), d);
            }
            ActionKind::Backward { distance } => {
                let d = distance.unwrap_or(DEFAULT_DISTANCE_IN);
                self.straight(&format!("backward {} in", num(d)), -d);
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

/// Appends the reusable drive primitive: set targets, switch to position
/// control, power up, poll with timeout, stop, restore velocity control.
fn emit_encoder_drive(w: &mut SourceWriter, drivetrain: &DrivetrainConfig) {
    let wheels = wheel_idents(drivetrain);
    let params = wheels
        .iter()
        .map(|i| format!("double {}Inches", i))
        .collect::<Vec<_>>()
        .join(", ");
    w.open(format!(
        "private void encoderDrive(double speed, {}, double timeoutS)",
        params
    ));
    w.open("if (!opModeIsActive())");
    w.line("return;");
    w.close();
    w.blank();
    for wheel in &wheels {
        w.line(format!(
            "int {w}Target = {w}.getCurrentPosition() + (int) ({w}Inches * COUNTS_PER_INCH);",
            w = wheel
        ));
    }
    for wheel in &wheels {
        w.line(format!("{w}.setTargetPosition({w}Target);", w = wheel));
    }
    w.blank();
    for wheel in &wheels {
        w.line(format!("{}.setMode(DcMotor.RunMode.RUN_TO_POSITION);", wheel));
    }
    w.blank();
    w.line("runtime.reset();");
    for wheel in &wheels {
        w.line(format!("{}.setPower(Math.abs(speed));", wheel));
    }
    w.blank();
    let busy = wheels
        .iter()
        .map(|i| format!("{}.isBusy()", i))
        .collect::<Vec<_>>()
        .join(" || ");
    w.open(format!(
        "while (opModeIsActive() && runtime.seconds() < timeoutS && ({}))",
        busy
    ));
    w.line("idle();");
    w.close();
    w.blank();
    for wheel in &wheels {
        w.line(format!("{}.setPower(0);", wheel));
    }
    for wheel in &wheels {
        w.line(format!("{}.setMode(DcMotor.RunMode.RUN_USING_ENCODER);", wheel));
    }
    w.close();
}

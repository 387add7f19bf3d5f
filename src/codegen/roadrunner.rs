use super::simple::loop_var;
use super::walker::{GraphWalker, StatementEmitter};
use super::writer::{SourceWriter, num};
use super::{CodeBackend, DeviceUsage, condition_text, mechanism_statement};
use crate::device::DeviceRegistry;
use crate::error::CodegenError;
use crate::routine::{ActionKind, ProgramGraph};
use crate::sim::{DEFAULT_ANGLE_DEG, DEFAULT_DISTANCE_IN, DEFAULT_DURATION_S, Pose, apply_movement};

/// The RoadRunner target: every node lowers inline into one trajectory
/// sequence builder chain. Non-movement actions become temporal-marker
/// callbacks at the current chain position, so mechanisms genuinely
/// interleave with motion; branching nodes emit markers whose bodies use
/// native Java control constructs and recurse through the shared walker.
pub struct RoadRunnerBackend;

impl CodeBackend for RoadRunnerBackend {
    fn target_name(&self) -> &'static str {
        "road-runner"
    }

    fn class_name(&self) -> &'static str {
        "RoadRunnerAuto"
    }

    fn generate(
        &self,
        graph: &ProgramGraph,
        waypoints: &[Pose],
        devices: &DeviceRegistry,
    ) -> Result<String, CodegenError> {
        let usage = DeviceUsage::analyze(graph, devices);
        let initial = waypoints.first().copied().unwrap_or(Pose::new(0.0, 0.0, 0.0));

        let mut emitter = RoadRunnerEmitter {
            w: SourceWriter::new(),
            pose: initial,
            marker_depth: 0,
            opened_marker: Vec::new(),
            loop_depth: 0,
        };
        GraphWalker::new(graph).lower(&mut emitter)?;
        let chain = emitter.w.finish();

        let mut w = SourceWriter::new();
        w.line("/*");
        w.line(" * Generated autonomous routine - RoadRunner target.");
        w.line(" * The whole routine is one trajectory sequence; non-movement actions");
        w.line(" * ride along as temporal markers at their chain position.");
        w.line(" */");
        w.line("package org.firstinspires.ftc.teamcode;");
        w.blank();
        w.line("import com.acmerobotics.roadrunner.geometry.Pose2d;");
        w.line("import com.acmerobotics.roadrunner.geometry.Vector2d;");
        w.line("import com.qualcomm.robotcore.eventloop.opmode.Autonomous;");
        w.line("import com.qualcomm.robotcore.eventloop.opmode.LinearOpMode;");
        w.line("import com.qualcomm.robotcore.util.ElapsedTime;");
        w.line("import org.firstinspires.ftc.teamcode.drive.SampleMecanumDrive;");
        w.line("import org.firstinspires.ftc.teamcode.trajectorysequence.TrajectorySequence;");
        super::hardware_imports(&mut w, &usage, false);
        w.blank();
        w.line(format!(
            "@Autonomous(name = \"{}\", group = \"Generated\")",
            self.class_name()
        ));
        w.open(format!("public class {} extends LinearOpMode", self.class_name()));
        w.blank();
        super::declare_mechanism_fields(&mut w, &usage);
        if usage.any_sensors() || !usage.motors.is_empty() || !usage.servos.is_empty() {
            w.blank();
        }

        w.line("@Override");
        w.open("public void runOpMode()");
        w.line("SampleMecanumDrive drive = new SampleMecanumDrive(hardwareMap);");
        w.line(format!(
            "Pose2d startPose = new Pose2d({}, {}, Math.toRadians({}));",
            num(initial.x),
            num(initial.y),
            num(initial.heading)
        ));
        w.line("drive.setPoseEstimate(startPose);");
        super::map_mechanism_hardware(&mut w, &usage);
        w.blank();
        w.line("TrajectorySequence routine = drive.trajectorySequenceBuilder(startPose)");
        w.indent();
        w.indent();
        w.lines(&chain);
        w.line(".build();");
        w.dedent();
        w.dedent();
        w.blank();
        w.line("telemetry.addData(\"Status\", \"Initialized\");");
        w.line("telemetry.update();");
        w.line("waitForStart();");
        w.open("if (isStopRequested())");
        w.line("return;");
        w.close();
        w.blank();
        w.line("drive.followTrajectorySequence(routine);");
        w.close();
        w.close();

        Ok(w.finish())
    }
}

struct RoadRunnerEmitter {
    w: SourceWriter,
    pose: Pose,
    /// How many temporal-marker bodies the walker is currently inside.
    marker_depth: usize,
    /// Per branching construct: whether it opened its own marker.
    opened_marker: Vec<bool>,
    loop_depth: usize,
}

impl RoadRunnerEmitter {
    fn open_marker(&mut self) {
        self.w.line(".addTemporalMarker(() -> {");
        self.w.indent();
        self.marker_depth += 1;
    }

    fn close_marker(&mut self) {
        self.marker_depth -= 1;
        self.w.close_with("})");
    }

    fn in_marker(&self) -> bool {
        self.marker_depth > 0
    }

    /// Enters a branching construct, wrapping it in a marker when emitted at
    /// chain level.
    fn enter_construct(&mut self) {
        let needs_marker = !self.in_marker();
        if needs_marker {
            self.open_marker();
        }
        self.opened_marker.push(needs_marker);
    }

    fn exit_construct(&mut self) {
        if self.opened_marker.pop().unwrap_or(false) {
            self.close_marker();
        }
    }

    /// The builder call for one movement action at the current pose.
    fn chain_call(&self, action: &ActionKind) -> Option<String> {
        let call = match action {
            ActionKind::Forward { distance } => {
                format!(".forward({})", num(distance.unwrap_or(DEFAULT_DISTANCE_IN)))
            }
            ActionKind::Backward { distance } => {
                format!(".back({})", num(distance.unwrap_or(DEFAULT_DISTANCE_IN)))
            }
            ActionKind::StrafeLeft { distance } => {
                format!(".strafeLeft({})", num(distance.unwrap_or(DEFAULT_DISTANCE_IN)))
            }
            ActionKind::StrafeRight { distance } => {
                format!(".strafeRight({})", num(distance.unwrap_or(DEFAULT_DISTANCE_IN)))
            }
            ActionKind::TurnLeft { angle } => {
                format!(".turn(Math.toRadians({}))", num(-angle.unwrap_or(DEFAULT_ANGLE_DEG)))
            }
            ActionKind::TurnRight { angle } => {
                format!(".turn(Math.toRadians({}))", num(angle.unwrap_or(DEFAULT_ANGLE_DEG)))
            }
            ActionKind::TurnToHeading { heading } => {
                format!(".turn(Math.toRadians({}))", num(heading - self.pose.heading))
            }
            ActionKind::MoveToPosition { x, y, heading } => format!(
                ".lineToLinearHeading(new Pose2d({}, {}, Math.toRadians({})))",
                num(*x),
                num(*y),
                num(heading.unwrap_or(self.pose.heading))
            ),
            ActionKind::SplineTo { x, y, heading } => format!(
                ".splineTo(new Vector2d({}, {}), Math.toRadians({}))",
                num(*x),
                num(*y),
                num(heading.unwrap_or(self.pose.heading))
            ),
            _ => return None,
        };
        Some(call)
    }

    /// A blocking inline sequence used for movement reached inside a marker
    /// body, where the surrounding chain cannot absorb it.
    fn inline_movement(&mut self, call: &str) {
        self.w.line("drive.followTrajectorySequence(");
        self.w.indent();
        self.w
            .line("drive.trajectorySequenceBuilder(drive.getPoseEstimate())");
        self.w.indent();
        self.w.line(call);
        self.w.line(".build());");
        self.w.dedent();
        self.w.dedent();
    }
}

impl StatementEmitter for RoadRunnerEmitter {
    fn emit_action(&mut self, action: &ActionKind, combined: Option<&ActionKind>) {
        if let Some(call) = self.chain_call(action) {
            if self.in_marker() {
                self.inline_movement(&call);
            } else {
                if let Some(combined) = combined {
                    self.open_marker();
                    mechanism_statement(&mut self.w, combined, false);
                    self.close_marker();
                }
                self.w.line(call);
            }
            if let Some(next) = apply_movement(action, self.pose) {
                self.pose = next;
            }
            return;
        }

        match action {
            ActionKind::Wait { duration } if !self.in_marker() => {
                self.w.line(format!(
                    ".waitSeconds({})",
                    num(duration.unwrap_or(DEFAULT_DURATION_S))
                ));
            }
            other => {
                if self.in_marker() {
                    mechanism_statement(&mut self.w, other, false);
                } else {
                    self.open_marker();
                    mechanism_statement(&mut self.w, other, false);
                    self.close_marker();
                }
            }
        }
    }

    fn begin_conditional(&mut self, condition: &str) {
        self.enter_construct();
        self.w.open(format!("if ({})", condition_text(condition)));
    }

    fn begin_else(&mut self) {
        self.w.dedent();
        self.w.line("} else {");
        self.w.indent();
    }

    fn end_conditional(&mut self) {
        self.w.close();
        self.exit_construct();
    }

    fn begin_loop(&mut self, count: u32, iterator: Option<&str>) {
        self.enter_construct();
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
        self.exit_construct();
    }

    fn begin_parallel(&mut self) {
        self.enter_construct();
        self.w
            .line("// parallel block: branches run sequentially in this target");
    }

    fn parallel_branch(&mut self, index: u8) {
        self.w.line(format!("// parallel branch {}", index));
    }

    fn end_parallel(&mut self) {
        self.exit_construct();
    }

    fn emit_cycle_guard(&mut self, node_id: &str) {
        self.w
            .line(format!("// cycle detected at node '{}'; branch halted", node_id));
    }
}

use super::simple::loop_var;
use super::walker::{GraphWalker, StatementEmitter};
use super::writer::{SourceWriter, num};
use super::{CodeBackend, DeviceUsage, condition_text, mechanism_statement};
use crate::device::DeviceRegistry;
use crate::error::CodegenError;
use crate::routine::{ActionKind, ProgramGraph};
use crate::sim::Pose;
use itertools::Itertools;

/// The PedroPathing target: all motion folds into a single path chain built
/// from consecutive waypoints, followed once; every other action is deferred
/// into a second phase driven by a three-state machine. Motion and
/// mechanisms are never interleaved in this target.
pub struct PedroPathingBackend;

impl CodeBackend for PedroPathingBackend {
    fn target_name(&self) -> &'static str {
        "pedro-pathing"
    }

    fn class_name(&self) -> &'static str {
        "PedroPathingAuto"
    }

    fn generate(
        &self,
        graph: &ProgramGraph,
        waypoints: &[Pose],
        devices: &DeviceRegistry,
    ) -> Result<String, CodegenError> {
        let usage = DeviceUsage::analyze(graph, devices);
        let initial = waypoints.first().copied().unwrap_or(Pose::new(0.0, 0.0, 0.0));
        let has_path = waypoints.len() >= 2;

        let mut emitter = PedroEmitter {
            w: SourceWriter::new(),
            loop_depth: 0,
            branch_depth: 0,
        };
        GraphWalker::new(graph).lower(&mut emitter)?;
        let mechanisms = emitter.w.finish();

        let mut w = SourceWriter::new();
        w.line("/*");
        w.line(" * Generated autonomous routine - PedroPathing target.");
        w.line(" * The routine's movement nodes become one bezier path chain; all");
        w.line(" * other actions run after the follower finishes, via a state machine.");
        w.line(" */");
        w.line("package org.firstinspires.ftc.teamcode;");
        w.blank();
        w.line("import com.pedropathing.follower.Follower;");
        w.line("import com.pedropathing.localization.Pose;");
        w.line("import com.pedropathing.pathgen.BezierLine;");
        w.line("import com.pedropathing.pathgen.PathChain;");
        w.line("import com.pedropathing.pathgen.Point;");
        w.line("import com.qualcomm.robotcore.eventloop.opmode.Autonomous;");
        w.line("import com.qualcomm.robotcore.eventloop.opmode.LinearOpMode;");
        super::hardware_imports(&mut w, &usage, false);
        w.blank();
        w.line(format!(
            "@Autonomous(name = \"{}\", group = \"Generated\")",
            self.class_name()
        ));
        w.open(format!("public class {} extends LinearOpMode", self.class_name()));
        w.blank();
        w.line("private static final int FOLLOWING_PATH = 0;");
        w.line("private static final int EXECUTING_MECHANISMS = 1;");
        w.line("private static final int COMPLETE = 2;");
        w.blank();
        w.line("private Follower follower;");
        if has_path {
            w.line("private PathChain routine;");
        }
        w.line("private int pathState = FOLLOWING_PATH;");
        super::declare_mechanism_fields(&mut w, &usage);
        w.blank();

        w.line("@Override");
        w.open("public void runOpMode()");
        w.line("follower = new Follower(hardwareMap);");
        w.line(format!(
            "follower.setStartingPose(new Pose({}, {}, Math.toRadians({})));",
            num(initial.x),
            num(initial.y),
            num(initial.heading)
        ));
        super::map_mechanism_hardware(&mut w, &usage);
        w.blank();

        if has_path {
            w.line("routine = follower.pathBuilder()");
            w.indent();
            w.indent();
            for (from, to) in waypoints.iter().tuple_windows() {
                w.line(format!(
                    ".addPath(new BezierLine(new Point({}, {}, Point.CARTESIAN), new Point({}, {}, Point.CARTESIAN)))",
                    num(from.x),
                    num(from.y),
                    num(to.x),
                    num(to.y)
                ));
                w.line(format!(
                    ".setLinearHeadingInterpolation(Math.toRadians({}), Math.toRadians({}))",
                    num(from.heading),
                    num(to.heading)
                ));
            }
            w.line(".build();");
            w.dedent();
            w.dedent();
            w.blank();
        }

        w.line("telemetry.addData(\"Status\", \"Initialized\");");
        w.line("telemetry.update();");
        w.line("waitForStart();");
        w.open("if (isStopRequested())");
        w.line("return;");
        w.close();
        w.blank();
        if has_path {
            w.line("follower.followPath(routine);");
        } else {
            w.line("pathState = EXECUTING_MECHANISMS;");
        }
        w.blank();

        w.open("while (opModeIsActive() && pathState != COMPLETE)");
        w.line("follower.update();");
        w.open("switch (pathState)");
        w.line("case FOLLOWING_PATH:");
        w.indent();
        w.open("if (!follower.isBusy())");
        w.line("pathState = EXECUTING_MECHANISMS;");
        w.close();
        w.line("break;");
        w.dedent();
        w.line("case EXECUTING_MECHANISMS:");
        w.indent();
        w.lines(&mechanisms);
        w.line("pathState = COMPLETE;");
        w.line("break;");
        w.dedent();
        w.line("default:");
        w.indent();
        w.line("break;");
        w.dedent();
        w.close();
        w.close();
        w.close();
        w.close();

        Ok(w.finish())
    }
}

/// Emits only the deferred, non-movement phase. Spine movement nodes were
/// already folded into the path chain by the backend, so they lower to
/// nothing here; movement inside a branch body cannot join the chain and is
/// skipped with a note.
struct PedroEmitter {
    w: SourceWriter,
    loop_depth: usize,
    branch_depth: usize,
}

impl StatementEmitter for PedroEmitter {
    fn emit_action(&mut self, action: &ActionKind, combined: Option<&ActionKind>) {
        if let Some(combined) = combined {
            mechanism_statement(&mut self.w, combined, true);
        }
        if action.is_movement() {
            if self.branch_depth > 0 {
                self.w
                    .line("// movement inside a branch is not part of the path chain; skipped");
            }
            return;
        }
        mechanism_statement(&mut self.w, action, true);
    }

    fn begin_conditional(&mut self, condition: &str) {
        self.branch_depth += 1;
        self.w.open(format!("if ({})", condition_text(condition)));
    }

    fn begin_else(&mut self) {
        self.w.dedent();
        self.w.line("} else {");
        self.w.indent();
    }

    fn end_conditional(&mut self) {
        self.branch_depth = self.branch_depth.saturating_sub(1);
        self.w.close();
    }

    fn begin_loop(&mut self, count: u32, iterator: Option<&str>) {
        let var = loop_var(self.loop_depth, iterator);
        self.loop_depth += 1;
        self.branch_depth += 1;
        self.w.open(format!(
            "for (int {v} = 0; {v} < {c}; {v}++)",
            v = var,
            c = count
        ));
    }

    fn end_loop(&mut self) {
        self.loop_depth = self.loop_depth.saturating_sub(1);
        self.branch_depth = self.branch_depth.saturating_sub(1);
        self.w.close();
    }

    fn begin_parallel(&mut self) {
        self.branch_depth += 1;
        self.w
            .line("// parallel block: branches run sequentially in this target");
    }

    fn parallel_branch(&mut self, index: u8) {
        self.w.line(format!("// parallel branch {}", index));
    }

    fn end_parallel(&mut self) {
        self.branch_depth = self.branch_depth.saturating_sub(1);
    }

    fn emit_cycle_guard(&mut self, node_id: &str) {
        self.w
            .line(format!("// cycle detected at node '{}'; branch halted", node_id));
    }
}

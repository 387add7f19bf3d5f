//! The four code generation backends and the shared lowering machinery.
//!
//! Every backend consumes the same inputs — a validated [`ProgramGraph`],
//! the derived waypoints and the read-only [`DeviceRegistry`] — and produces
//! one self-contained Java OpMode source file for its runtime style.

mod encoder;
mod pedro;
mod roadrunner;
mod simple;
mod walker;
mod writer;

use crate::device::DeviceRegistry;
use crate::error::CodegenError;
use crate::routine::{ActionKind, NodeKind, ProgramGraph};
use crate::sim::{DEFAULT_DURATION_S, DEFAULT_POWER, Pose};
use std::fmt;
use tracing::debug;

pub use encoder::EncoderBackend;
pub use pedro::PedroPathingBackend;
pub use roadrunner::RoadRunnerBackend;
pub use simple::SimpleBackend;

pub(crate) use writer::{SourceWriter, java_ident, num};

/// The available code generation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "kiseki-cli", derive(clap::ValueEnum))]
pub enum GeneratorChoice {
    /// Open-loop, time-based driving. No feedback of any kind.
    Simple,
    /// Closed-loop position driving through motor encoders.
    Encoder,
    /// PedroPathing path-follower state machine.
    PedroPathing,
    /// RoadRunner trajectory sequence with temporal markers.
    RoadRunner,
}

impl GeneratorChoice {
    pub const ALL: [GeneratorChoice; 4] = [
        GeneratorChoice::Simple,
        GeneratorChoice::Encoder,
        GeneratorChoice::PedroPathing,
        GeneratorChoice::RoadRunner,
    ];
}

impl fmt::Display for GeneratorChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeneratorChoice::Simple => "simple",
            GeneratorChoice::Encoder => "encoder",
            GeneratorChoice::PedroPathing => "pedro-pathing",
            GeneratorChoice::RoadRunner => "road-runner",
        };
        f.write_str(name)
    }
}

/// A code generation backend lowering a routine into procedural source text.
pub trait CodeBackend {
    fn target_name(&self) -> &'static str;

    /// The Java class name of the emitted OpMode.
    fn class_name(&self) -> &'static str;

    /// Lowers the routine. Pure; fails only when the start node has no
    /// outgoing route.
    fn generate(
        &self,
        graph: &ProgramGraph,
        waypoints: &[Pose],
        devices: &DeviceRegistry,
    ) -> Result<String, CodegenError>;
}

/// Generates source for `choice` from one immutable snapshot of the inputs.
pub fn generate(
    choice: GeneratorChoice,
    graph: &ProgramGraph,
    waypoints: &[Pose],
    devices: &DeviceRegistry,
) -> Result<String, CodegenError> {
    debug!(target = %choice, nodes = graph.nodes().len(), "generating routine source");
    match choice {
        GeneratorChoice::Simple => SimpleBackend.generate(graph, waypoints, devices),
        GeneratorChoice::Encoder => EncoderBackend.generate(graph, waypoints, devices),
        GeneratorChoice::PedroPathing => PedroPathingBackend.generate(graph, waypoints, devices),
        GeneratorChoice::RoadRunner => RoadRunnerBackend.generate(graph, waypoints, devices),
    }
}

/// Which devices a routine actually references, resolved against the
/// registry. Backends declare only what shows up here.
#[derive(Debug, Default)]
pub(crate) struct DeviceUsage {
    pub motors: Vec<String>,
    pub servos: Vec<String>,
    pub touch_sensors: Vec<String>,
    pub color_sensors: Vec<String>,
    pub distance_sensors: Vec<String>,
    pub has_movement: bool,
}

impl DeviceUsage {
    /// Walks every node reachable from the start and records referenced
    /// device names. Custom-code bodies are scanned textually against the
    /// enabled registry entries; a name referenced by an action but absent
    /// from the registry degrades to a default, it is never an error.
    pub fn analyze(graph: &ProgramGraph, devices: &DeviceRegistry) -> Self {
        let mut usage = DeviceUsage::default();
        let mut reachable = graph.reachable_from(graph.start_id());
        reachable.insert(graph.start_id().to_string());

        // Walk the node list, not the reachable set, so declaration order in
        // the generated file is stable across runs.
        for node in graph.nodes() {
            if !reachable.contains(&node.id) {
                continue;
            }
            let NodeKind::Action { action, combined } = &node.kind else {
                continue;
            };
            usage.record(action, devices);
            if let Some(combined) = combined {
                usage.record(combined, devices);
            }
        }
        usage
    }

    fn record(&mut self, action: &ActionKind, devices: &DeviceRegistry) {
        use crate::device::SensorKind;

        match action {
            ActionKind::SetMotorPower { motor, .. }
            | ActionKind::RunMotorToPosition { motor, .. }
            | ActionKind::StopMotor { motor }
            | ActionKind::IntakeIn { motor, .. }
            | ActionKind::IntakeOut { motor, .. }
            | ActionKind::ArmUp { motor, .. }
            | ActionKind::ArmDown { motor, .. } => {
                push_unique(&mut self.motors, resolve_name(motor, "motor"));
            }
            ActionKind::SetServoPosition { servo, .. }
            | ActionKind::OpenClaw { servo }
            | ActionKind::CloseClaw { servo } => {
                push_unique(&mut self.servos, resolve_name(servo, "servo"));
            }
            ActionKind::WaitForTouch { sensor } => {
                push_unique(&mut self.touch_sensors, resolve_name(sensor, "touchSensor"));
            }
            ActionKind::WaitForColor { sensor, .. } => {
                push_unique(&mut self.color_sensors, resolve_name(sensor, "colorSensor"));
            }
            ActionKind::WaitForDistance { sensor, .. } => {
                push_unique(
                    &mut self.distance_sensors,
                    resolve_name(sensor, "distanceSensor"),
                );
            }
            ActionKind::CustomCode { code } => {
                for motor in devices.enabled_motors() {
                    if code.contains(&motor.name) {
                        push_unique(&mut self.motors, motor.name.clone());
                    }
                }
                for servo in devices.enabled_servos() {
                    if code.contains(&servo.name) {
                        push_unique(&mut self.servos, servo.name.clone());
                    }
                }
                for sensor in devices.enabled_sensors() {
                    if code.contains(&sensor.name) {
                        let bucket = match sensor.kind {
                            SensorKind::Touch => &mut self.touch_sensors,
                            SensorKind::Color => &mut self.color_sensors,
                            SensorKind::Distance => &mut self.distance_sensors,
                        };
                        push_unique(bucket, sensor.name.clone());
                    }
                }
            }
            other if other.is_movement() => self.has_movement = true,
            _ => {}
        }
    }

    pub fn any_sensors(&self) -> bool {
        !self.touch_sensors.is_empty()
            || !self.color_sensors.is_empty()
            || !self.distance_sensors.is_empty()
    }
}

fn push_unique(list: &mut Vec<String>, name: String) {
    if !list.contains(&name) {
        list.push(name);
    }
}

/// Empty device names fall back to a generic hardware-map name so the
/// generated file still compiles.
pub(crate) fn resolve_name(name: &str, fallback: &str) -> String {
    if name.trim().is_empty() {
        fallback.to_string()
    } else {
        name.to_string()
    }
}

/// Raw condition text with a safe fallback for unconfigured nodes.
pub(crate) fn condition_text(condition: &str) -> &str {
    let trimmed = condition.trim();
    if trimmed.is_empty() { "true" } else { condition.trim() }
}

/// Declares the mechanism/sensor fields a routine references.
pub(crate) fn declare_mechanism_fields(w: &mut SourceWriter, usage: &DeviceUsage) {
    for motor in &usage.motors {
        w.line(format!("private DcMotor {};", java_ident(motor)));
    }
    for servo in &usage.servos {
        w.line(format!("private Servo {};", java_ident(servo)));
    }
    for sensor in &usage.touch_sensors {
        w.line(format!("private TouchSensor {};", java_ident(sensor)));
    }
    for sensor in &usage.color_sensors {
        w.line(format!("private ColorSensor {};", java_ident(sensor)));
    }
    for sensor in &usage.distance_sensors {
        w.line(format!("private DistanceSensor {};", java_ident(sensor)));
    }
}

/// Maps the declared mechanism/sensor fields from the hardware map.
pub(crate) fn map_mechanism_hardware(w: &mut SourceWriter, usage: &DeviceUsage) {
    for motor in &usage.motors {
        w.line(format!(
            "{} = hardwareMap.get(DcMotor.class, \"{}\");",
            java_ident(motor),
            motor
        ));
    }
    for servo in &usage.servos {
        w.line(format!(
            "{} = hardwareMap.get(Servo.class, \"{}\");",
            java_ident(servo),
            servo
        ));
    }
    for sensor in &usage.touch_sensors {
        w.line(format!(
            "{} = hardwareMap.get(TouchSensor.class, \"{}\");",
            java_ident(sensor),
            sensor
        ));
    }
    for sensor in &usage.color_sensors {
        w.line(format!(
            "{} = hardwareMap.get(ColorSensor.class, \"{}\");",
            java_ident(sensor),
            sensor
        ));
    }
    for sensor in &usage.distance_sensors {
        w.line(format!(
            "{} = hardwareMap.get(DistanceSensor.class, \"{}\");",
            java_ident(sensor),
            sensor
        ));
    }
}

/// Hardware imports for the devices a routine references. `drive_motors`
/// adds the motor import even without mechanism motors, for the targets that
/// address drivetrain wheels directly.
pub(crate) fn hardware_imports(w: &mut SourceWriter, usage: &DeviceUsage, drive_motors: bool) {
    if drive_motors || !usage.motors.is_empty() {
        w.line("import com.qualcomm.robotcore.hardware.DcMotor;");
    }
    if !usage.servos.is_empty() {
        w.line("import com.qualcomm.robotcore.hardware.Servo;");
    }
    if !usage.touch_sensors.is_empty() {
        w.line("import com.qualcomm.robotcore.hardware.TouchSensor;");
    }
    if !usage.color_sensors.is_empty() {
        w.line("import com.qualcomm.robotcore.hardware.ColorSensor;");
    }
    if !usage.distance_sensors.is_empty() {
        w.line("import com.qualcomm.robotcore.hardware.DistanceSensor;");
        w.line("import org.firstinspires.ftc.robotcore.external.navigation.DistanceUnit;");
    }
}

/// Lowers one mechanism, sensor, wait or custom-code action into plain Java
/// statements. `allow_sleep` is false inside contexts that must not call
/// `sleep` (temporal-marker bodies); waits there spin on an `ElapsedTime`
/// instead of being dropped.
pub(crate) fn mechanism_statement(w: &mut SourceWriter, action: &ActionKind, allow_sleep: bool) {
    match action {
        ActionKind::SetServoPosition { servo, position } => {
            w.line(format!(
                "{}.setPosition({});",
                java_ident(&resolve_name(servo, "servo")),
                num(position.unwrap_or(DEFAULT_POWER))
            ));
        }
        ActionKind::SetMotorPower { motor, power } => {
            w.line(format!(
                "{}.setPower({});",
                java_ident(&resolve_name(motor, "motor")),
                num(power.unwrap_or(DEFAULT_POWER))
            ));
        }
        ActionKind::RunMotorToPosition {
            motor,
            target_ticks,
            power,
        } => {
            let ident = java_ident(&resolve_name(motor, "motor"));
            w.line(format!("{}.setTargetPosition({});", ident, target_ticks));
            w.line(format!(
                "{}.setMode(DcMotor.RunMode.RUN_TO_POSITION);",
                ident
            ));
            w.line(format!(
                "{}.setPower({});",
                ident,
                num(power.unwrap_or(DEFAULT_POWER))
            ));
        }
        ActionKind::StopMotor { motor } => {
            w.line(format!(
                "{}.setPower(0);",
                java_ident(&resolve_name(motor, "motor"))
            ));
        }
        ActionKind::OpenClaw { servo } => {
            w.line(format!(
                "{}.setPosition(1.00);",
                java_ident(&resolve_name(servo, "servo"))
            ));
        }
        ActionKind::CloseClaw { servo } => {
            w.line(format!(
                "{}.setPosition(0.00);",
                java_ident(&resolve_name(servo, "servo"))
            ));
        }
        ActionKind::IntakeIn { motor, power } => {
            w.line(format!(
                "{}.setPower({});",
                java_ident(&resolve_name(motor, "motor")),
                num(power.unwrap_or(DEFAULT_POWER))
            ));
        }
        ActionKind::IntakeOut { motor, power } => {
            w.line(format!(
                "{}.setPower(-{});",
                java_ident(&resolve_name(motor, "motor")),
                num(power.unwrap_or(DEFAULT_POWER))
            ));
        }
        ActionKind::ArmUp { motor, power } => {
            w.line(format!(
                "{}.setPower({});",
                java_ident(&resolve_name(motor, "motor")),
                num(power.unwrap_or(DEFAULT_POWER))
            ));
        }
        ActionKind::ArmDown { motor, power } => {
            w.line(format!(
                "{}.setPower(-{});",
                java_ident(&resolve_name(motor, "motor")),
                num(power.unwrap_or(DEFAULT_POWER))
            ));
        }

        ActionKind::WaitForTouch { sensor } => {
            let ident = java_ident(&resolve_name(sensor, "touchSensor"));
            w.open(format!("while (opModeIsActive() && !{}.isPressed())", ident));
            w.line("idle();");
            w.close();
        }
        ActionKind::WaitForColor { sensor, target } => {
            let ident = java_ident(&resolve_name(sensor, "colorSensor"));
            w.line(format!("// wait until '{}' reads {}", ident, target));
            w.open(format!(
                "while (opModeIsActive() && {})",
                color_wait_condition(&ident, target)
            ));
            w.line("idle();");
            w.close();
        }
        ActionKind::WaitForDistance {
            sensor,
            threshold_in,
        } => {
            let ident = java_ident(&resolve_name(sensor, "distanceSensor"));
            w.open(format!(
                "while (opModeIsActive() && {}.getDistance(DistanceUnit.INCH) > {})",
                ident,
                num(threshold_in.unwrap_or(12.0))
            ));
            w.line("idle();");
            w.close();
        }

        ActionKind::Wait { duration } => {
            let seconds = duration.unwrap_or(DEFAULT_DURATION_S);
            if allow_sleep {
                w.line(format!("sleep({});", (seconds * 1000.0).round() as i64));
            } else {
                // Marker bodies must not call sleep; spin on a scoped timer.
                w.line("{");
                w.indent();
                w.line("ElapsedTime waitTimer = new ElapsedTime();");
                w.open(format!(
                    "while (opModeIsActive() && waitTimer.seconds() < {})",
                    num(seconds)
                ));
                w.line("idle();");
                w.close();
                w.dedent();
                w.line("}");
            }
        }
        ActionKind::CustomCode { code } => {
            w.lines(code);
        }

        // Movement and branching actions are lowered per-backend.
        _ => {}
    }
}

/// Java condition that is true while the color sensor does *not* yet see the
/// requested color.
fn color_wait_condition(ident: &str, target: &str) -> String {
    match target.to_ascii_lowercase().as_str() {
        "red" => format!(
            "{i}.red() <= Math.max({i}.green(), {i}.blue())",
            i = ident
        ),
        "green" => format!(
            "{i}.green() <= Math.max({i}.red(), {i}.blue())",
            i = ident
        ),
        "blue" => format!(
            "{i}.blue() <= Math.max({i}.red(), {i}.green())",
            i = ident
        ),
        _ => format!("{}.alpha() < 200", ident),
    }
}

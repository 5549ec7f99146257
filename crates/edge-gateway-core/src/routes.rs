//! Static route table.
//!
//! Each external operation is one [`RouteSpec`]: an HTTP method and path, the
//! [`CommandKey`] it dispatches to, and a validator that turns the caller's
//! body into the envelope parameters. The table is data; the daemon registers
//! one handler per entry when it builds its router.

use crate::CommandKey;
use crate::validate::{AngleLimits, Fields, ValidationError, angle_sector, coordinates, each_object};
use serde_json::{Map, Value};

pub const COMMAND_CONTROL: &str = "command-control";
pub const AUDIO: &str = "audio";
pub const CAMERA: &str = "camera";

pub const DEFAULT_REBOOT_REASON: &str = "User requested reboot";

pub const VOLUME_MIN: f64 = 0.0;
pub const VOLUME_MAX: f64 = 100.0;
pub const EQ_GAIN_DB: f64 = 6.0;
pub const FENCE_ANGLE: AngleLimits = AngleLimits {
    min_angle: 0.0,
    max_angle: 180.0,
    min_span: 30.0,
    max_span: 90.0,
};
pub const VIDEO_FENCE_POINTS: usize = 4;

/// 0=Manual, 1=Auto Framing, 2=Active Speaker, 3=Intelligent Focus.
pub const CAMERA_MODES: &[i64] = &[0, 1, 2, 3];
/// 0=Tight, 1=Normal, 2=Wide.
pub const FRAME_PADDINGS: &[i64] = &[0, 1, 2];

/// Turns a caller's JSON object into validated envelope parameters.
pub type Validator = fn(&Map<String, Value>) -> Result<Map<String, Value>, ValidationError>;

/// HTTP verb of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read, no body.
    Get,
    /// Write, small JSON body.
    Post,
}

/// One external operation.
#[derive(Debug, Clone, Copy)]
pub struct RouteSpec {
    pub method: Method,
    pub path: &'static str,
    pub subsystem: &'static str,
    pub action: &'static str,
    pub validator: Validator,
}

impl RouteSpec {
    const fn get(path: &'static str, subsystem: &'static str, action: &'static str) -> Self {
        Self {
            method: Method::Get,
            path,
            subsystem,
            action,
            validator: no_params,
        }
    }

    const fn post(
        path: &'static str,
        subsystem: &'static str,
        action: &'static str,
        validator: Validator,
    ) -> Self {
        Self {
            method: Method::Post,
            path,
            subsystem,
            action,
            validator,
        }
    }

    pub fn key(&self) -> CommandKey {
        CommandKey::new(self.subsystem, self.action)
    }

    /// Validate a caller's body.
    ///
    /// `None` (no body) is treated as an empty object; a body that is not a
    /// JSON object is rejected.
    pub fn validate(&self, body: Option<&Value>) -> Result<Value, ValidationError> {
        let empty = Map::new();
        let map = match body {
            None | Some(Value::Null) => &empty,
            Some(Value::Object(map)) => map,
            Some(_) => return Err(ValidationError::NotAnObject),
        };
        (self.validator)(map).map(Value::Object)
    }
}

/// The full table of device operations.
pub static ROUTES: &[RouteSpec] = &[
    // Device
    RouteSpec::get("/api/device/get-device-info", COMMAND_CONTROL, "get-device-info"),
    RouteSpec::get("/api/device/get-aio-bar-id", COMMAND_CONTROL, "get-aio-bar-id"),
    // System
    RouteSpec::post("/api/system/reboot", COMMAND_CONTROL, "system-reboot", system_reboot),
    RouteSpec::post("/api/device/system-reboot", COMMAND_CONTROL, "system-reboot", system_reboot),
    // Wi-Fi
    RouteSpec::get("/api/wifi/get-wifi-details", COMMAND_CONTROL, "get-wifi-details"),
    RouteSpec::get("/api/wifi/scan-wifi", COMMAND_CONTROL, "scan-wifi"),
    RouteSpec::post("/api/wifi/disconnect-wifi", COMMAND_CONTROL, "disconnect-wifi", disconnect_wifi),
    RouteSpec::post("/api/wifi/connect-wifi", COMMAND_CONTROL, "connect-wifi", connect_wifi),
    // Ethernet
    RouteSpec::get("/api/network/get-ethernet-details", COMMAND_CONTROL, "get-ethernet-details"),
    // Date and time
    RouteSpec::get("/api/datetime/get-datetime", COMMAND_CONTROL, "get-datetime"),
    RouteSpec::post("/api/datetime/set-datetime", COMMAND_CONTROL, "set-datetime", set_datetime),
    RouteSpec::get("/api/timezone/list-timezones", COMMAND_CONTROL, "list-timezones"),
    RouteSpec::get("/api/timezone/get-timezone", COMMAND_CONTROL, "get-timezone"),
    RouteSpec::post("/api/timezone/set-timezone", COMMAND_CONTROL, "set-timezone", set_timezone),
    RouteSpec::get("/api/ntp/get-ntp-server", COMMAND_CONTROL, "get-ntp-server"),
    RouteSpec::post("/api/ntp/set-ntp-server", COMMAND_CONTROL, "set-ntp-server", set_ntp_server),
    RouteSpec::get("/api/ntp/get-ntp-enable", COMMAND_CONTROL, "get-ntp-enable"),
    RouteSpec::post("/api/ntp/set-ntp-enable", COMMAND_CONTROL, "set-ntp-enable", set_enable),
    // Speaker
    RouteSpec::get("/api/audio/get-active-speaker", AUDIO, "get-active-speaker"),
    RouteSpec::get("/api/audio/get-sound-cards", AUDIO, "get-sound-cards"),
    RouteSpec::get("/api/audio/get-speaker-mute", AUDIO, "get-speaker-mute"),
    RouteSpec::post("/api/audio/set-speaker-mute", AUDIO, "set-speaker-mute", set_speaker_mute),
    RouteSpec::get("/api/audio/get-speaker-volume", AUDIO, "get-speaker-volume"),
    RouteSpec::post("/api/audio/set-speaker-volume", AUDIO, "set-speaker-volume", set_speaker_volume),
    // Microphone
    RouteSpec::get("/api/microphone/get-input-eq", AUDIO, "get-input-eq"),
    RouteSpec::post("/api/microphone/set-input-eq", AUDIO, "set-input-eq", set_input_eq),
    // Audio fence
    RouteSpec::get("/api/audio-fence/get-parameters", AUDIO, "get-fence-parameters"),
    RouteSpec::post("/api/audio-fence/enable", AUDIO, "enable-fence", fence_angle),
    RouteSpec::post("/api/audio-fence/disable", AUDIO, "disable-fence", no_params),
    RouteSpec::post("/api/audio-fence/set-angle", AUDIO, "set-fence-angle", fence_angle),
    RouteSpec::get("/api/audio-fence/get-status", AUDIO, "get-fence-status"),
    // Camera
    RouteSpec::get("/api/camera/device", CAMERA, "get-device"),
    RouteSpec::get("/api/camera/roomstate", CAMERA, "get-room-state"),
    RouteSpec::get("/api/camera/intelligentvideo", CAMERA, "get-intelligent-video"),
    RouteSpec::post("/api/camera/intelligentvideo", CAMERA, "set-intelligent-video", set_intelligent_video),
    RouteSpec::post("/api/camera/mode", CAMERA, "set-mode", set_camera_mode),
    RouteSpec::get("/api/camera/fence/status", CAMERA, "get-fence-status"),
    RouteSpec::post("/api/camera/fence/enable", CAMERA, "enable-fence", no_params),
    RouteSpec::post("/api/camera/fence/disable", CAMERA, "disable-fence", no_params),
    RouteSpec::post("/api/camera/fence/coordinates", CAMERA, "set-fence-coordinates", set_fence_coordinates),
    RouteSpec::post("/api/camera/autoframe", CAMERA, "set-autoframe", set_autoframe),
    RouteSpec::post("/api/camera/talkerswitch", CAMERA, "set-talkerswitch", set_talkerswitch),
    RouteSpec::post("/api/camera/intelligentfocus", CAMERA, "set-intelligent-focus", set_intelligent_focus),
    RouteSpec::get("/api/camera/externalvideo", CAMERA, "get-external-video"),
    RouteSpec::post("/api/camera/externalvideo", CAMERA, "set-external-video", set_enable),
];

/// Lookup over [`ROUTES`].
pub struct RouteTable;

impl RouteTable {
    pub fn all() -> &'static [RouteSpec] {
        ROUTES
    }

    pub fn find(method: Method, path: &str) -> Option<&'static RouteSpec> {
        ROUTES.iter().find(|r| r.method == method && r.path == path)
    }

    pub fn by_key(key: &CommandKey) -> Option<&'static RouteSpec> {
        ROUTES
            .iter()
            .find(|r| r.subsystem == key.subsystem() && r.action == key.action())
    }
}

/// Read routes and bodiless writes: always `{}`.
pub fn no_params(_: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
    Ok(Map::new())
}

fn single(name: &str, value: &Value) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert(name.to_string(), value.clone());
    out
}

fn put(out: &mut Map<String, Value>, name: &str, value: Option<&Value>) {
    if let Some(value) = value {
        out.insert(name.to_string(), value.clone());
    }
}

fn system_reboot(body: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
    let fields = Fields::new(body);
    let reason = fields
        .optional_string("reason")?
        .cloned()
        .unwrap_or_else(|| Value::from(DEFAULT_REBOOT_REASON));
    Ok(single("reason", &reason))
}

fn disconnect_wifi(body: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
    let fields = Fields::new(body);
    Ok(single("id", fields.string("id")?))
}

fn connect_wifi(body: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
    let fields = Fields::new(body);
    let mut out = single("ssid", fields.string("ssid")?);
    put(&mut out, "password", Some(fields.string("password")?));
    Ok(out)
}

fn set_datetime(body: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
    Ok(single("datetime", Fields::new(body).string("datetime")?))
}

fn set_timezone(body: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
    Ok(single("timezone", Fields::new(body).string("timezone")?))
}

fn set_ntp_server(body: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
    Ok(single("ntpserver", Fields::new(body).string("ntpserver")?))
}

fn set_enable(body: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
    Ok(single("enable", Fields::new(body).boolean("enable")?))
}

fn set_speaker_mute(body: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
    Ok(single("mute", Fields::new(body).boolean("mute")?))
}

fn set_speaker_volume(body: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
    let volume = Fields::new(body).number_in("volume", VOLUME_MIN, VOLUME_MAX)?;
    Ok(single("volume", volume))
}

fn set_input_eq(body: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
    let bands = each_object(&Fields::new(body), "bands", |band| {
        let mut out = single("bandwidth", band.number("bandwidth")?);
        put(&mut out, "frequency", Some(band.number("frequency")?));
        put(&mut out, "gain", Some(band.number_in("gain", -EQ_GAIN_DB, EQ_GAIN_DB)?));
        Ok(out)
    })?;
    Ok(single("bands", &bands))
}

fn fence_angle(body: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
    let angle = angle_sector(&Fields::new(body), "fenceAngle", FENCE_ANGLE)?;
    Ok(single("fenceAngle", &angle))
}

fn set_camera_mode(body: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
    Ok(single("mode", Fields::new(body).one_of("mode", CAMERA_MODES)?))
}

fn set_fence_coordinates(body: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
    let points = coordinates(&Fields::new(body), "fenceCoordinates", VIDEO_FENCE_POINTS)?;
    Ok(single("fenceCoordinates", &points))
}

const AUTOFRAME_FIELDS: &[&str] = &["framePadding", "transitionSpeed"];
const TALKERSWITCH_FIELDS: &[&str] = &["framePadding", "level", "time"];
const FOCUS_FIELDS: &[&str] = &["peopleShown", "roomViewEnabled"];
const INTELLIGENT_VIDEO_FIELDS: &[&str] = &[
    "mode",
    "fenceEnabled",
    "fenceCoordinates",
    "autoframe",
    "talkerswitch",
    "intelligentfocus",
];

fn autoframe(fields: &Fields<'_>) -> Result<Map<String, Value>, ValidationError> {
    fields.at_least_one(AUTOFRAME_FIELDS)?;
    let mut out = Map::new();
    put(&mut out, "framePadding", fields.optional_one_of("framePadding", FRAME_PADDINGS)?);
    put(&mut out, "transitionSpeed", fields.optional_non_negative("transitionSpeed")?);
    Ok(out)
}

fn talkerswitch(fields: &Fields<'_>) -> Result<Map<String, Value>, ValidationError> {
    fields.at_least_one(TALKERSWITCH_FIELDS)?;
    let mut out = Map::new();
    put(&mut out, "framePadding", fields.optional_one_of("framePadding", FRAME_PADDINGS)?);
    put(&mut out, "level", fields.optional_number("level")?);
    put(&mut out, "time", fields.optional_non_negative("time")?);
    Ok(out)
}

fn intelligent_focus(fields: &Fields<'_>) -> Result<Map<String, Value>, ValidationError> {
    fields.at_least_one(FOCUS_FIELDS)?;
    let mut out = Map::new();
    put(&mut out, "peopleShown", fields.optional_count("peopleShown")?);
    put(&mut out, "roomViewEnabled", fields.optional_boolean("roomViewEnabled")?);
    Ok(out)
}

fn set_autoframe(body: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
    autoframe(&Fields::new(body))
}

fn set_talkerswitch(body: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
    talkerswitch(&Fields::new(body))
}

fn set_intelligent_focus(body: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
    intelligent_focus(&Fields::new(body))
}

/// Partial update of the whole camera configuration.
fn set_intelligent_video(body: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
    let fields = Fields::new(body);
    fields.at_least_one(INTELLIGENT_VIDEO_FIELDS)?;

    let mut out = Map::new();
    put(&mut out, "mode", fields.optional_one_of("mode", CAMERA_MODES)?);
    put(&mut out, "fenceEnabled", fields.optional_boolean("fenceEnabled")?);
    if fields.has("fenceCoordinates") {
        let points = coordinates(&fields, "fenceCoordinates", VIDEO_FENCE_POINTS)?;
        out.insert("fenceCoordinates".into(), points);
    }
    if fields.has("autoframe") {
        let nested = autoframe(&fields.object("autoframe")?)?;
        out.insert("autoframe".into(), Value::Object(nested));
    }
    if fields.has("talkerswitch") {
        let nested = talkerswitch(&fields.object("talkerswitch")?)?;
        out.insert("talkerswitch".into(), Value::Object(nested));
    }
    if fields.has("intelligentfocus") {
        let nested = intelligent_focus(&fields.object("intelligentfocus")?)?;
        out.insert("intelligentfocus".into(), Value::Object(nested));
    }
    Ok(out)
}

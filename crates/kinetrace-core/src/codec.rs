//! Wire encodings shared by local backup files and the remote collector.
//!
//! Field order and float formatting are part of the contract: floats are
//! rendered with exactly six decimal places, booleans as `1`/`0` in rows and
//! `true`/`false` in JSON. serde_json does not render fixed-precision float
//! text, so the sample encoders assemble their output by hand; tests parse
//! the results back to keep them honest JSON.

use serde_json::json;
use thiserror::Error;

use crate::sample::{ControllerState, Pose, Sample};

/// Column header line for local backup files (no trailing newline)
pub const CSV_HEADER: &str = "timestamp,\
    head_pos_x,head_pos_y,head_pos_z,head_rot_x,head_rot_y,head_rot_z,head_rot_w,\
    left_tracked,left_pos_x,left_pos_y,left_pos_z,left_rot_x,left_rot_y,left_rot_z,left_rot_w,left_trigger,\
    right_tracked,right_pos_x,right_pos_y,right_pos_z,right_rot_x,right_rot_y,right_rot_z,right_rot_w,right_trigger,\
    button_a";

/// Number of fields in one encoded row
pub const ROW_FIELDS: usize = 27;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("row has {got} fields, expected {expected}")]
    FieldCount { expected: usize, got: usize },
    #[error("field {index} is not a number: {value:?}")]
    InvalidFloat { index: usize, value: String },
    #[error("field {index} is not a 0/1 flag: {value:?}")]
    InvalidFlag { index: usize, value: String },
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn pose_fields(pose: &Pose) -> String {
    format!(
        "{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}",
        pose.position[0],
        pose.position[1],
        pose.position[2],
        pose.orientation[0],
        pose.orientation[1],
        pose.orientation[2],
        pose.orientation[3],
    )
}

fn controller_fields(controller: &ControllerState) -> String {
    format!(
        "{},{},{:.6}",
        flag(controller.tracked),
        pose_fields(&controller.pose),
        controller.trigger,
    )
}

/// Encode one sample as a CSV row matching [`CSV_HEADER`]
pub fn encode_row(sample: &Sample) -> String {
    format!(
        "{:.6},{},{},{},{}",
        sample.timestamp,
        pose_fields(&sample.head),
        controller_fields(&sample.left),
        controller_fields(&sample.right),
        flag(sample.input.button_a),
    )
}

fn parse_f64(fields: &[&str], index: usize) -> Result<f64, CodecError> {
    fields[index].parse().map_err(|_| CodecError::InvalidFloat {
        index,
        value: fields[index].to_string(),
    })
}

fn parse_f32(fields: &[&str], index: usize) -> Result<f32, CodecError> {
    fields[index].parse().map_err(|_| CodecError::InvalidFloat {
        index,
        value: fields[index].to_string(),
    })
}

fn parse_flag(fields: &[&str], index: usize) -> Result<bool, CodecError> {
    match fields[index] {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(CodecError::InvalidFlag {
            index,
            value: other.to_string(),
        }),
    }
}

fn parse_pose(fields: &[&str], start: usize) -> Result<Pose, CodecError> {
    Ok(Pose {
        position: [
            parse_f32(fields, start)?,
            parse_f32(fields, start + 1)?,
            parse_f32(fields, start + 2)?,
        ],
        orientation: [
            parse_f32(fields, start + 3)?,
            parse_f32(fields, start + 4)?,
            parse_f32(fields, start + 5)?,
            parse_f32(fields, start + 6)?,
        ],
    })
}

fn parse_controller(fields: &[&str], start: usize) -> Result<ControllerState, CodecError> {
    Ok(ControllerState {
        tracked: parse_flag(fields, start)?,
        pose: parse_pose(fields, start + 1)?,
        trigger: parse_f32(fields, start + 8)?,
    })
}

/// Decode one CSV row back into a sample.
///
/// Inverse of [`encode_row`] up to the six-decimal precision of the row
/// format. Trailing newlines are tolerated; the header line is not.
pub fn decode_row(row: &str) -> Result<Sample, CodecError> {
    let fields: Vec<&str> = row.trim_end().split(',').collect();
    if fields.len() != ROW_FIELDS {
        return Err(CodecError::FieldCount {
            expected: ROW_FIELDS,
            got: fields.len(),
        });
    }

    let mut sample = Sample {
        timestamp: parse_f64(&fields, 0)?,
        head: parse_pose(&fields, 1)?,
        left: parse_controller(&fields, 8)?,
        right: parse_controller(&fields, 17)?,
        ..Sample::default()
    };
    sample.input.button_a = parse_flag(&fields, 26)?;
    Ok(sample)
}

fn pos_rot_json(pose: &Pose) -> String {
    format!(
        "\"pos\":[{:.6},{:.6},{:.6}],\"rot\":[{:.6},{:.6},{:.6},{:.6}]",
        pose.position[0],
        pose.position[1],
        pose.position[2],
        pose.orientation[0],
        pose.orientation[1],
        pose.orientation[2],
        pose.orientation[3],
    )
}

fn controller_json(controller: &ControllerState) -> String {
    format!(
        "{{\"tracked\":{},{},\"trigger\":{:.6}}}",
        controller.tracked,
        pos_rot_json(&controller.pose),
        controller.trigger,
    )
}

/// Encode one sample as a structured JSON object (nested poses, named
/// buttons). Not used on the collector path, which wants flat columns.
pub fn encode_json(sample: &Sample) -> String {
    format!(
        "{{\"timestamp\":{:.6},\"head\":{{{}}},\"left\":{},\"right\":{},\"buttons\":{{\"a\":{}}}}}",
        sample.timestamp,
        pos_rot_json(&sample.head),
        controller_json(&sample.left),
        controller_json(&sample.right),
        sample.input.button_a,
    )
}

/// Escape a string for embedding in a JSON string literal
pub fn escape_json(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

fn head_fields_json(pose: &Pose) -> String {
    format!(
        "\"head_pos_x\":{:.6},\"head_pos_y\":{:.6},\"head_pos_z\":{:.6},\
         \"head_rot_x\":{:.6},\"head_rot_y\":{:.6},\"head_rot_z\":{:.6},\"head_rot_w\":{:.6}",
        pose.position[0],
        pose.position[1],
        pose.position[2],
        pose.orientation[0],
        pose.orientation[1],
        pose.orientation[2],
        pose.orientation[3],
    )
}

fn controller_fields_json(prefix: &str, controller: &ControllerState) -> String {
    format!(
        "\"{p}_tracked\":{},\
         \"{p}_pos_x\":{:.6},\"{p}_pos_y\":{:.6},\"{p}_pos_z\":{:.6},\
         \"{p}_rot_x\":{:.6},\"{p}_rot_y\":{:.6},\"{p}_rot_z\":{:.6},\"{p}_rot_w\":{:.6},\
         \"{p}_trigger\":{:.6}",
        controller.tracked,
        controller.pose.position[0],
        controller.pose.position[1],
        controller.pose.position[2],
        controller.pose.orientation[0],
        controller.pose.orientation[1],
        controller.pose.orientation[2],
        controller.pose.orientation[3],
        controller.trigger,
        p = prefix,
    )
}

fn frame_object(session_id: &str, sample: &Sample) -> String {
    format!(
        "{{\"session_id\":\"{}\",\"timestamp\":{:.6},\"frame_data\":\"{}\",{},{},{},\"button_a\":{}}}",
        escape_json(session_id),
        sample.timestamp,
        escape_json(&encode_row(sample)),
        head_fields_json(&sample.head),
        controller_fields_json("left", &sample.left),
        controller_fields_json("right", &sample.right),
        sample.input.button_a,
    )
}

/// Build the collector batch payload: a JSON array with one flat object per
/// sample, each carrying the full CSV row in `frame_data` plus every scalar
/// as its own typed column.
pub fn batch_payload(session_id: &str, samples: &[Sample]) -> String {
    let mut payload = String::with_capacity(samples.len() * 768 + 2);
    payload.push('[');
    for (i, sample) in samples.iter().enumerate() {
        if i > 0 {
            payload.push(',');
        }
        payload.push_str(&frame_object(session_id, sample));
    }
    payload.push(']');
    payload
}

/// Build the session-registration payload
pub fn session_payload(
    session_id: &str,
    device_info: &str,
    start_time: i64,
) -> serde_json::Value {
    json!({
        "session_id": session_id,
        "device_info": device_info,
        "start_time": start_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::InputState;

    fn tracked_sample() -> Sample {
        Sample {
            timestamp: 4.2,
            head: Pose::new([0.1, 1.65, -0.3], [0.0, 0.7071, 0.0, 0.7071]),
            left: ControllerState {
                tracked: true,
                pose: Pose::new([-0.25, 1.1, -0.4], [0.1, 0.2, 0.3, 0.9]),
                trigger: 0.75,
            },
            right: ControllerState {
                tracked: false,
                pose: Pose::default(),
                trigger: 0.0,
            },
            input: InputState {
                button_a: true,
                ..InputState::default()
            },
        }
    }

    #[test]
    fn header_matches_row_field_count() {
        assert_eq!(CSV_HEADER.split(',').count(), ROW_FIELDS);
        assert_eq!(encode_row(&Sample::default()).split(',').count(), ROW_FIELDS);
    }

    #[test]
    fn default_sample_row_is_stable() {
        let row = encode_row(&Sample::default());
        assert_eq!(
            row,
            "0.000000,\
             0.000000,0.000000,0.000000,0.000000,0.000000,0.000000,1.000000,\
             0,0.000000,0.000000,0.000000,0.000000,0.000000,0.000000,1.000000,0.000000,\
             0,0.000000,0.000000,0.000000,0.000000,0.000000,0.000000,1.000000,0.000000,\
             0"
        );
    }

    #[test]
    fn row_round_trips_at_six_decimals() {
        let sample = tracked_sample();
        let back = decode_row(&encode_row(&sample)).unwrap();

        assert!((back.timestamp - sample.timestamp).abs() < 1e-6);
        for i in 0..3 {
            assert!((back.head.position[i] - sample.head.position[i]).abs() < 1e-6);
            assert!((back.left.pose.position[i] - sample.left.pose.position[i]).abs() < 1e-6);
        }
        for i in 0..4 {
            assert!((back.head.orientation[i] - sample.head.orientation[i]).abs() < 1e-6);
        }
        assert_eq!(back.left.tracked, sample.left.tracked);
        assert_eq!(back.right.tracked, sample.right.tracked);
        assert!((back.left.trigger - sample.left.trigger).abs() < 1e-6);
        assert_eq!(back.input.button_a, sample.input.button_a);
    }

    #[test]
    fn decode_tolerates_trailing_newline() {
        let row = format!("{}\n", encode_row(&Sample::at(1.0)));
        assert_eq!(decode_row(&row).unwrap().timestamp, 1.0);
    }

    #[test]
    fn decode_rejects_wrong_field_count() {
        match decode_row("1.0,2.0,3.0") {
            Err(CodecError::FieldCount { expected, got }) => {
                assert_eq!(expected, ROW_FIELDS);
                assert_eq!(got, 3);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_bad_float_and_flag() {
        let mut fields: Vec<String> = encode_row(&Sample::default())
            .split(',')
            .map(str::to_string)
            .collect();

        fields[3] = "abc".to_string();
        assert!(matches!(
            decode_row(&fields.join(",")),
            Err(CodecError::InvalidFloat { index: 3, .. })
        ));

        fields[3] = "0.000000".to_string();
        fields[8] = "2".to_string();
        assert!(matches!(
            decode_row(&fields.join(",")),
            Err(CodecError::InvalidFlag { index: 8, .. })
        ));
    }

    #[test]
    fn structured_json_is_valid_and_nested() {
        let value: serde_json::Value =
            serde_json::from_str(&encode_json(&tracked_sample())).unwrap();

        assert_eq!(value["head"]["rot"][3], 0.7071);
        assert_eq!(value["left"]["tracked"], true);
        assert_eq!(value["left"]["trigger"], 0.75);
        assert_eq!(value["right"]["tracked"], false);
        assert_eq!(value["buttons"]["a"], true);
    }

    #[test]
    fn batch_payload_is_valid_json_array() {
        let samples = vec![tracked_sample(), Sample::at(5.0)];
        let payload = batch_payload("session-abc", &samples);
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();

        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["session_id"], "session-abc");
        assert_eq!(rows[0]["left_trigger"], 0.75);
        assert_eq!(rows[0]["button_a"], true);
        assert_eq!(rows[1]["timestamp"], 5.0);

        // frame_data embeds the exact row encoding
        assert_eq!(
            rows[0]["frame_data"].as_str().unwrap(),
            encode_row(&samples[0])
        );
    }

    #[test]
    fn empty_batch_payload_is_empty_array() {
        assert_eq!(batch_payload("session-abc", &[]), "[]");
    }

    #[test]
    fn session_payload_shape() {
        let value = session_payload("session-abc", "Test HMD", 1_700_000_000);
        assert_eq!(value["session_id"], "session-abc");
        assert_eq!(value["device_info"], "Test HMD");
        assert_eq!(value["start_time"], 1_700_000_000);
    }

    #[test]
    fn escape_json_covers_control_characters() {
        assert_eq!(escape_json(r#"a"b\c"#), r#"a\"b\\c"#);
        assert_eq!(escape_json("line1\nline2\tend\r"), "line1\\nline2\\tend\\r");
        assert_eq!(escape_json("plain"), "plain");
    }
}

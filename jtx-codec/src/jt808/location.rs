//! 位置信息汇报（0x0200）附加信息项

use jtx_core::{DataType, Width};
use serde::Serialize;

use crate::schema::{ExtraMsgBody, SchemaBuilder};

/// 位置附加信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocationExtra {
    /// 0x01 里程，1/10 km
    pub mileage: Option<u32>,
    /// 0x02 油量，1/10 L
    pub fuel: Option<u16>,
    /// 0x03 行驶记录功能获取的速度，1/10 km/h
    pub recorder_speed: Option<u16>,
    /// 0x04 需要人工确认报警事件的ID
    pub alarm_event_id: Option<u16>,

    /// 0x25 扩展车辆信号状态位
    pub vehicle_signal: Option<u32>,
    pub low_beam: bool,
    pub high_beam: bool,
    pub right_turn: bool,
    pub left_turn: bool,
    pub brake: bool,

    /// 0x2A IO状态位
    pub io_status: Option<u16>,
    pub deep_sleep: bool,
    pub sleep: bool,

    /// 0x2B 模拟量，bit0-15为AD0，bit16-31为AD1
    pub analog: Option<u32>,
    pub ad0: Option<u16>,
    pub ad1: Option<u16>,

    /// 0x30 无线通信网络信号强度
    pub signal_strength: Option<u8>,
    /// 0x31 GNSS定位卫星数
    pub gnss_satellites: Option<u8>,

    /// 0xE1 厂商自定义块
    pub vendor: Option<VendorBlock>,
}

impl LocationExtra {
    /// 里程（km）
    pub fn mileage_km(&self) -> Option<f64> {
        self.mileage.map(|m| f64::from(m) / 10.0)
    }

    /// 油量（L）
    pub fn fuel_litres(&self) -> Option<f64> {
        self.fuel.map(|f| f64::from(f) / 10.0)
    }
}

impl ExtraMsgBody for LocationExtra {
    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.leaf(0x01, "mileage", DataType::Dword, |r: &mut Self, v| {
            r.mileage = Some(v)
        });
        schema.leaf(0x02, "fuel", DataType::Word, |r: &mut Self, v| r.fuel = Some(v));
        schema.leaf(0x03, "recorder_speed", DataType::Word, |r: &mut Self, v| {
            r.recorder_speed = Some(v)
        });
        schema.leaf(0x04, "alarm_event_id", DataType::Word, |r: &mut Self, v| {
            r.alarm_event_id = Some(v)
        });

        schema
            .leaf(0x25, "vehicle_signal", DataType::Dword, |r: &mut Self, v| {
                r.vehicle_signal = Some(v)
            })
            .flag("low_beam", 0, |r, v| r.low_beam = v)
            .flag("high_beam", 1, |r, v| r.high_beam = v)
            .flag("right_turn", 2, |r, v| r.right_turn = v)
            .flag("left_turn", 3, |r, v| r.left_turn = v)
            .flag("brake", 4, |r, v| r.brake = v);

        schema
            .leaf(0x2A, "io_status", DataType::Word, |r: &mut Self, v| {
                r.io_status = Some(v)
            })
            .flag("deep_sleep", 0, |r, v| r.deep_sleep = v)
            .flag("sleep", 1, |r, v| r.sleep = v);

        schema.leaf(0x2B, "analog", DataType::Dword, |r: &mut Self, v| {
            r.analog = Some(v)
        });
        schema
            .sliced_bits("ad1", |r: &Self| r.analog.as_ref(), 0, 16, |r, v| {
                r.ad1 = Some(v as u16)
            })
            .sliced_bits("ad0", |r: &Self| r.analog.as_ref(), 16, 16, |r, v| {
                r.ad0 = Some(v as u16)
            });

        schema.leaf(0x30, "signal_strength", DataType::Byte, |r: &mut Self, v| {
            r.signal_strength = Some(v)
        });
        schema.leaf(0x31, "gnss_satellites", DataType::Byte, |r: &mut Self, v| {
            r.gnss_satellites = Some(v)
        });

        schema.nested(0xE1, "vendor", |r: &mut Self, v| r.vendor = Some(v));
    }
}

/// 厂商自定义块，标签和长度各占两个字节
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VendorBlock {
    /// 0x0001 主电源电压，mV
    pub voltage: Option<u16>,
    /// 0x0002 固件版本
    pub firmware: Option<String>,
    /// 0x0003 固件编译时间，YYMMDDhhmmss
    pub build_time: Option<String>,
    /// 0x0010 温度探头
    pub temperature: Option<TemperatureBlock>,
}

impl ExtraMsgBody for VendorBlock {
    const TAG_WIDTH: Width = Width::Two;
    const LENGTH_WIDTH: Width = Width::Two;

    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.leaf(0x0001, "voltage", DataType::Word, |r: &mut Self, v| {
            r.voltage = Some(v)
        });
        schema.leaf(0x0002, "firmware", DataType::String, |r: &mut Self, v| {
            r.firmware = Some(v)
        });
        schema.leaf(0x0003, "build_time", DataType::Bcd8421, |r: &mut Self, v| {
            r.build_time = Some(v)
        });
        schema.nested(0x0010, "temperature", |r: &mut Self, v| {
            r.temperature = Some(v)
        });
    }
}

/// 温度探头块
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemperatureBlock {
    /// 0x01 探头编号
    pub probe_id: Option<String>,
    /// 0x02 温度，1/10 ℃
    pub tenths: Option<u16>,
}

impl ExtraMsgBody for TemperatureBlock {
    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.leaf(0x01, "probe_id", DataType::String, |r: &mut Self, v| {
            r.probe_id = Some(v)
        });
        schema.leaf(0x02, "tenths", DataType::Word, |r: &mut Self, v| {
            r.tenths = Some(v)
        });
    }
}

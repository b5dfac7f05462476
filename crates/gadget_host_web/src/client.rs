//! [`GadgetClient`] backed by the player's injected JS client object.

use gadget_host::{ClientError, ClientFuture, ClientResult, Device, GadgetClient};
use js_sys::{Array, Function, Promise, Reflect};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

#[derive(Debug, Clone)]
/// Live client that forwards every call to methods on the host global.
///
/// Query results may be plain values or promises; both are awaited. Host failures surface as
/// [`ClientError::HostCall`] with the rejection text.
pub struct JsGadgetClient {
    host: JsValue,
}

impl JsGadgetClient {
    /// Wraps the host client object.
    pub fn new(host: JsValue) -> Self {
        Self { host }
    }

    fn method(&self, name: &str) -> ClientResult<Function> {
        Reflect::get(&self.host, &JsValue::from_str(name))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
            .ok_or_else(|| ClientError::MissingMethod(name.to_string()))
    }

    fn call(&self, name: &str, args: &[JsValue]) -> ClientResult<JsValue> {
        let function = self.method(name)?;
        let array = Array::new();
        for arg in args {
            array.push(arg);
        }
        function
            .apply(&self.host, &array)
            .map_err(|err| ClientError::host_call(name, describe(&err)))
    }

    fn command(&self, name: &str, args: &[JsValue]) -> ClientResult<()> {
        self.call(name, args).map(|_| ())
    }

    async fn query<T: DeserializeOwned>(
        &self,
        name: &str,
        args: Vec<JsValue>,
    ) -> ClientResult<Option<T>> {
        let returned = self.call(name, &args)?;
        let settled = JsFuture::from(Promise::resolve(&returned))
            .await
            .map_err(|err| ClientError::host_call(name, describe(&err)))?;
        decode(name, settled)
    }
}

fn describe(err: &JsValue) -> String {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

fn decode<T: DeserializeOwned>(name: &str, value: JsValue) -> ClientResult<Option<T>> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    serde_wasm_bindgen::from_value(value)
        .map(Some)
        .map_err(|err| ClientError::Decode {
            method: name.to_string(),
            message: err.to_string(),
        })
}

fn encode<T: Serialize + ?Sized>(name: &str, value: &T) -> ClientResult<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| ClientError::Encode {
            method: name.to_string(),
            message: err.to_string(),
        })
}

impl GadgetClient for JsGadgetClient {
    fn callback(&self, args: &[Value]) -> ClientResult<()> {
        let args = args
            .iter()
            .map(|arg| encode("callback", arg))
            .collect::<ClientResult<Vec<_>>>()?;
        self.command("callback", &args)
    }

    fn get_device_time<'a>(
        &'a self,
        date: Option<&'a str>,
    ) -> ClientFuture<'a, ClientResult<Option<String>>> {
        Box::pin(async move {
            let args: Vec<JsValue> = date
                .map(|iso| js_sys::Date::new(&JsValue::from_str(iso)).into())
                .into_iter()
                .collect();
            self.query("getDeviceTime", args).await
        })
    }

    fn get_device_time_zone_name<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>> {
        Box::pin(self.query("getDeviceTimeZoneName", Vec::new()))
    }

    fn get_device_time_zone_id<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>> {
        Box::pin(self.query("getDeviceTimeZoneID", Vec::new()))
    }

    fn get_device_time_zone_offset<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<f64>>> {
        Box::pin(self.query("getDeviceTimeZoneOffset", Vec::new()))
    }

    fn get_language_code<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>> {
        Box::pin(self.query("getLanguageCode", Vec::new()))
    }

    fn get_device_key<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>> {
        Box::pin(self.query("getDeviceKey", Vec::new()))
    }

    fn send_command(&self, name: &str, arg: &str) -> ClientResult<()> {
        self.command(
            "sendCommand",
            &[JsValue::from_str(name), JsValue::from_str(arg)],
        )
    }

    fn send_remote_command(
        &self,
        device_keys: &[String],
        name: &str,
        arg: &str,
    ) -> ClientResult<()> {
        let keys: Array = device_keys
            .iter()
            .map(|key| JsValue::from_str(key))
            .collect();
        self.command(
            "sendRemoteCommand",
            &[keys.into(), JsValue::from_str(name), JsValue::from_str(arg)],
        )
    }

    fn track(&self, event_name: &str, properties: Option<&Value>) -> ClientResult<()> {
        let mut args = vec![JsValue::from_str(event_name)];
        if let Some(properties) = properties {
            args.push(encode("track", properties)?);
        }
        self.command("track", &args)
    }

    fn time_event(&self, event_name: &str) -> ClientResult<()> {
        self.command("timeEvent", &[JsValue::from_str(event_name)])
    }

    fn new_event_session(&self, id: Option<&str>) -> ClientResult<()> {
        let args: Vec<JsValue> = id.map(JsValue::from_str).into_iter().collect();
        self.command("newEventSession", &args)
    }

    fn get_revel_root<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>> {
        Box::pin(self.query("getRevelRoot", Vec::new()))
    }

    fn get_command_map<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<Value>>> {
        Box::pin(self.query("getCommandMap", Vec::new()))
    }

    fn finish(&self) -> ClientResult<()> {
        self.command("finish", &[])
    }

    fn get_device<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<Device>>> {
        Box::pin(self.query("getDevice", Vec::new()))
    }

    fn get_width<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<f64>>> {
        Box::pin(self.query("getWidth", Vec::new()))
    }

    fn get_height<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<f64>>> {
        Box::pin(self.query("getHeight", Vec::new()))
    }

    fn get_duration<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<f64>>> {
        Box::pin(self.query("getDuration", Vec::new()))
    }

    fn get_sdk_version<'a>(&'a self) -> ClientFuture<'a, ClientResult<Option<String>>> {
        Box::pin(self.query("getSdkVersion", Vec::new()))
    }

    fn apply_config(&self, prefs: &Map<String, Value>) -> ClientResult<()> {
        let prefs = encode("applyConfig", prefs)?;
        self.command("applyConfig", &[prefs])
    }
}

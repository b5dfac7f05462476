use futures::StreamExt;
use gadget_host::{Command, ConfigMessage, FrameMessenger};
use gadget_host_web::WebFrameMessenger;
use gadget_runtime::{ready_signal, use_gadget_service, GadgetProvider};
use leptos::*;

#[component]
pub fn DemoApp() -> impl IntoView {
    view! {
        <GadgetProvider factory=gadget_host_web::browser_gadget_service>
            <GadgetStatus />
        </GadgetProvider>
    }
}

#[component]
pub fn GadgetStatus() -> impl IntoView {
    let service = use_gadget_service();
    let ready = ready_signal(&service);
    let playing = create_rw_signal(false);
    let last_command = create_rw_signal(None::<Command>);
    let command_count = create_rw_signal(0_usize);

    let (mut commands, command_feed) = service.channels().command().stream();
    spawn_local(async move {
        while let Some(command) = commands.next().await {
            command_count.update(|count| *count += 1);
            last_command.set(Some(command));
        }
    });

    let mut subscriptions = vec![
        service.on_start(move || playing.set(true)),
        service.on_stop(move || playing.set(false)),
        command_feed,
    ];
    on_cleanup(move || {
        for subscription in subscriptions.iter_mut() {
            subscription.unsubscribe();
        }
    });

    let mode = create_local_resource(|| (), {
        let service = service.clone();
        move |_| {
            let service = service.clone();
            async move {
                if service.is_preview_mode().await {
                    "preview"
                } else {
                    "player"
                }
            }
        }
    });
    let device_key = create_local_resource(|| (), {
        let service = service.clone();
        move |_| {
            let service = service.clone();
            async move {
                match service.get_device_key().await {
                    Ok(Some(key)) => key,
                    Ok(None) => "none".to_string(),
                    Err(err) => format!("error: {err}"),
                }
            }
        }
    });

    let finish = move |_| {
        let service = service.clone();
        spawn_local(async move {
            if let Err(err) = service.finish().await {
                logging::warn!("finish failed: {err}");
            }
        });
    };

    let open_config = move |_| {
        let posted = ConfigMessage::open()
            .to_json()
            .and_then(|raw| WebFrameMessenger.post_to_opener_or_parent(&raw));
        if let Err(err) = posted {
            logging::warn!("openConfig post failed: {err}");
        }
    };

    view! {
        <section class="gadget-status">
            <p>"Mode: " {move || mode.get().unwrap_or("resolving")}</p>
            <p>"Device: " {move || device_key.get().unwrap_or_default()}</p>
            <p>"Bridge ready: " {move || ready.get().to_string()}</p>
            <p>"Playing: " {move || playing.get().to_string()}</p>
            <p>
                "Last command: "
                {move || {
                    last_command
                        .get()
                        .map(|command| format!("{} {}", command.name, command.arg))
                        .unwrap_or_else(|| "none".to_string())
                }}
            </p>
            <p>"Commands received: " {move || command_count.get().to_string()}</p>
            <button on:click=open_config>"Configure"</button>
            <button on:click=finish>"Finish"</button>
        </section>
    }
}

use std::time::Duration;

use egui_kittest::Harness;
use mapconsole_business::maps::VersionTable;
use mapconsole_ui::MapConsoleApp;
use mapconsole_ui::state::State;
use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Wide enough that every column, status and actions included, is laid out.
const WINDOW_SIZE: egui::Vec2 = egui::vec2(2000.0, 800.0);

pub struct TestCtx<'a> {
    /// Kept alive so the mocked endpoint keeps answering.
    _mock_server: MockServer,
    harness: Harness<'a, MapConsoleApp>,
}

impl<'a> TestCtx<'a> {
    /// App whose listing endpoint answers every request with `body`.
    pub async fn new_app(body: Value) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/management/maps"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;

        let app = MapConsoleApp::new(State::test(mock_server.uri()));
        let harness = Harness::builder()
            .with_size(WINDOW_SIZE)
            .build_eframe(|_| app);

        Self {
            _mock_server: mock_server,
            harness,
        }
    }

    pub fn harness_mut(&mut self) -> &mut Harness<'a, MapConsoleApp> {
        &mut self.harness
    }

    pub fn table(&self) -> &VersionTable {
        self.harness.state().state.ctx.state::<VersionTable>()
    }

    /// Step frames until the first load has been applied.
    pub async fn wait_for_load(&mut self) {
        for _ in 0..100 {
            self.harness.step();
            tokio::time::sleep(Duration::from_millis(10)).await;
            if self.table().applied_generation() > 0 && !self.table().is_loading() {
                self.harness.step();
                return;
            }
        }
        panic!("initial load did not finish");
    }
}

//! 대시보드 로더.
//!
//! 현재 선택 상태의 스냅샷을 잡고, 필요한 지표들을 동시에 요청한 뒤
//! 모두 끝나면(join) 한 번에 병합합니다. 요청 도중 선택이 바뀌었으면
//! 결과를 버려 늦게 도착한 응답이 최신 화면을 덮어쓰지 않게 합니다.
//!
//! 실패한 시계열은 [`SeriesFailure`]로 보고되며 다른 시계열에는 영향이
//! 없습니다. 재시도나 진행 중 요청의 강제 취소는 하지 않습니다.

use std::sync::Arc;

use futures::future::join_all;
use invest_core::{
    InvestResult, Metric, MergedTable, NamedSeries, NormalizeMode, SelectionSnapshot,
    SelectionState,
};
use invest_data::{
    fetch_metric, ApiResponse, CorrelationParams, DataSource, EntityCodes, MetricsParams,
    VarParams,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn, Instrument};

use crate::aggregator::{Aggregator, ColumnNaming};
use crate::correlation::CorrelationMatrix;
use crate::normalize::normalize_series;
use crate::payload::series_from_response;
use crate::scatter::{combine_for_scatter, ScatterPoint};
use crate::views::{metrics_from_payload, var_from_payload, EntityMetrics, VarSummary};

/// 실패한 시계열 요청.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesFailure {
    pub metric: Metric,
    pub error: String,
}

/// 뷰 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewKind {
    /// 활성화된 모든 지표의 다중 시계열 차트
    Chart,
    /// 한 지표에 대한 엔티티 비교
    Comparison { metric: Metric },
    /// 두 지표의 엔티티별 평균 산점도
    Scatter { x: Metric, y: Metric },
}

/// 게시된 대시보드 뷰.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub kind: ViewKind,
    /// 이 뷰를 만든 선택 상태의 세대
    pub generation: u64,
    pub table: MergedTable,
    /// 산점도 뷰에서만 채워짐
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scatter: Vec<ScatterPoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SeriesFailure>,
}

impl DashboardView {
    fn empty(kind: ViewKind, generation: u64) -> Self {
        Self {
            kind,
            generation,
            table: MergedTable::default(),
            scatter: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// 로드 결과.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome<T> {
    /// 스냅샷이 여전히 최신이어서 게시됨
    Applied(T),
    /// 요청 도중 선택이 바뀌어 폐기됨
    Stale { requested: u64, current: u64 },
}

impl<T> LoadOutcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, LoadOutcome::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            LoadOutcome::Applied(v) => Some(v),
            LoadOutcome::Stale { .. } => None,
        }
    }
}

/// 지표 하나의 요청 결과.
struct MetricFetch {
    metric: Metric,
    response: ApiResponse<Value>,
}

/// 대시보드 데이터 로더.
pub struct DashboardLoader {
    source: Arc<dyn DataSource>,
    state: Arc<RwLock<SelectionState>>,
    aggregator: Aggregator,
    latest: RwLock<Option<DashboardView>>,
}

impl DashboardLoader {
    pub fn new(source: Arc<dyn DataSource>, state: Arc<RwLock<SelectionState>>) -> Self {
        Self {
            source,
            state,
            aggregator: Aggregator::default(),
            latest: RwLock::new(None),
        }
    }

    /// 차트 병합에 사용할 집계기를 바꿉니다.
    pub fn with_aggregator(mut self, aggregator: Aggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    pub fn state(&self) -> &Arc<RwLock<SelectionState>> {
        &self.state
    }

    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.source
    }

    /// 마지막으로 게시된 뷰.
    pub async fn latest(&self) -> Option<DashboardView> {
        self.latest.read().await.clone()
    }

    async fn snapshot(&self) -> SelectionSnapshot {
        self.state.read().await.snapshot()
    }

    /// 지표별 요청을 동시에 보내고 모두 끝날 때까지 기다립니다.
    async fn fetch_all(&self, codes: &EntityCodes, metrics: &[Metric]) -> Vec<MetricFetch> {
        let entities = codes.all_codes().join(",");
        let futures: Vec<_> = metrics
            .iter()
            .map(|&metric| {
                let span = invest_core::series_span!("fetch_series", entities, metric);
                let codes = codes.clone();
                async move {
                    let response = fetch_metric(self.source.as_ref(), metric, codes).await;
                    MetricFetch { metric, response }
                }
                .instrument(span)
            })
            .collect();

        join_all(futures).await
    }

    /// 요청 결과를 시계열로 변환하고 실패를 모읍니다.
    fn collect_series(
        fetches: Vec<MetricFetch>,
        codes: &[String],
        normalize_for: impl Fn(Metric) -> NormalizeMode,
    ) -> (Vec<NamedSeries>, Vec<SeriesFailure>) {
        let mut series = Vec::new();
        let mut failures = Vec::new();

        for fetch in fetches {
            if !fetch.response.is_success() {
                let error = fetch
                    .response
                    .error
                    .unwrap_or_else(|| "Failed to fetch data".to_string());
                warn!(metric = %fetch.metric, error = %error, "시계열 로드 실패");
                failures.push(SeriesFailure {
                    metric: fetch.metric,
                    error,
                });
                continue;
            }

            let mode = normalize_for(fetch.metric);
            let loaded = series_from_response(&fetch.response, codes, fetch.metric);
            debug!(metric = %fetch.metric, series = loaded.len(), "시계열 로드 완료");
            series.extend(loaded.iter().map(|s| normalize_series(s, mode)));
        }

        (series, failures)
    }

    /// 스냅샷이 여전히 최신인지 확인합니다. `on_current`는 상태 읽기 잠금을
    /// 쥔 채로 실행되므로 확인과 반영 사이에 선택이 바뀌지 않습니다.
    async fn settle<T>(
        &self,
        snapshot: &SelectionSnapshot,
        value: T,
        on_current: impl FnOnce(&T),
    ) -> LoadOutcome<T> {
        let state = self.state.read().await;
        if !state.is_current(snapshot) {
            debug!(
                requested = snapshot.generation,
                current = state.generation(),
                "오래된 응답 폐기"
            );
            return LoadOutcome::Stale {
                requested: snapshot.generation,
                current: state.generation(),
            };
        }
        on_current(&value);
        LoadOutcome::Applied(value)
    }

    /// 스냅샷이 최신이면 뷰를 게시합니다.
    async fn publish(
        &self,
        snapshot: &SelectionSnapshot,
        view: DashboardView,
    ) -> LoadOutcome<DashboardView> {
        let mut latest = self.latest.write().await;
        self.settle(snapshot, view, |view| *latest = Some(view.clone()))
            .await
    }

    /// 활성화된 모든 지표를 선택된 모든 엔티티에 대해 로드합니다.
    pub async fn load_chart(&self) -> LoadOutcome<DashboardView> {
        let snapshot = self.snapshot().await;
        let codes = EntityCodes::from(&snapshot.selection);
        let configs = snapshot.enabled_series();

        if codes.is_empty() || configs.is_empty() {
            let view = DashboardView::empty(ViewKind::Chart, snapshot.generation);
            return self.publish(&snapshot, view).await;
        }

        let metrics: Vec<Metric> = configs.iter().map(|c| c.metric).collect();
        info!(entities = codes.all_codes().len(), metrics = metrics.len(), "차트 로드");

        let fetches = self.fetch_all(&codes, &metrics).await;
        let (series, failures) = Self::collect_series(fetches, &codes.all_codes(), |m| {
            snapshot
                .config(m)
                .map(|c| c.normalize)
                .unwrap_or_default()
        });

        let view = DashboardView {
            kind: ViewKind::Chart,
            generation: snapshot.generation,
            table: self.aggregator.merge(&series),
            scatter: Vec::new(),
            failures,
        };
        self.publish(&snapshot, view).await
    }

    /// 한 지표에 대해 선택된 엔티티를 비교합니다. 컬럼은 엔티티 코드입니다.
    pub async fn load_comparison(&self, metric: Metric) -> LoadOutcome<DashboardView> {
        let snapshot = self.snapshot().await;
        let codes = EntityCodes::from(&snapshot.selection);
        let kind = ViewKind::Comparison { metric };

        if codes.is_empty() {
            return self
                .publish(&snapshot, DashboardView::empty(kind, snapshot.generation))
                .await;
        }

        let fetches = self.fetch_all(&codes, &[metric]).await;
        let (series, failures) = Self::collect_series(fetches, &codes.all_codes(), |m| {
            snapshot
                .config(m)
                .map(|c| c.normalize)
                .unwrap_or_default()
        });

        let view = DashboardView {
            kind,
            generation: snapshot.generation,
            table: Aggregator::with_naming(ColumnNaming::Entity).merge(&series),
            scatter: Vec::new(),
            failures,
        };
        self.publish(&snapshot, view).await
    }

    /// 두 지표를 함께 요청해 엔티티별 평균 산점도를 만듭니다.
    pub async fn load_scatter(&self, x: Metric, y: Metric) -> LoadOutcome<DashboardView> {
        let snapshot = self.snapshot().await;
        let codes = EntityCodes::from(&snapshot.selection);
        let kind = ViewKind::Scatter { x, y };

        if codes.is_empty() {
            return self
                .publish(&snapshot, DashboardView::empty(kind, snapshot.generation))
                .await;
        }

        let all_codes = codes.all_codes();
        let metrics = if x == y { vec![x] } else { vec![x, y] };
        let fetches = self.fetch_all(&codes, &metrics).await;
        let (series, failures) =
            Self::collect_series(fetches, &all_codes, |_| NormalizeMode::None);

        let by_entity = Aggregator::with_naming(ColumnNaming::Entity);
        let axis_table = |metric: Metric| {
            let selected: Vec<NamedSeries> = series
                .iter()
                .filter(|s| s.key.metric == metric)
                .cloned()
                .collect();
            by_entity.merge(&selected)
        };
        let x_table = axis_table(x);
        let y_table = axis_table(y);

        let view = DashboardView {
            kind,
            generation: snapshot.generation,
            scatter: combine_for_scatter(&x_table, &y_table, &all_codes),
            table: self.aggregator.merge(&series),
            failures,
        };
        self.publish(&snapshot, view).await
    }

    /// 선택된 엔티티의 상관행렬.
    ///
    /// 응답 형식이 어긋나면 상관행렬 없이(`None`) 반환합니다. 요청 도중
    /// 선택이 바뀌었으면 `Stale`입니다.
    pub async fn load_correlations(
        &self,
        params: CorrelationParams,
    ) -> InvestResult<LoadOutcome<Option<CorrelationMatrix>>> {
        let snapshot = self.snapshot().await;
        let codes = EntityCodes::from(&snapshot.selection);
        let labels = codes.all_codes();
        let params = CorrelationParams { codes, ..params };

        let data = self.source.correlations(&params).await.into_result()?;
        let matrix = CorrelationMatrix::from_payload(&data, &labels);
        if matrix.is_none() {
            warn!("상관행렬 응답 형식이 올바르지 않음");
        }
        Ok(self.settle(&snapshot, matrix, |_| {}).await)
    }

    /// 선택된 엔티티의 성과 지표.
    pub async fn load_metrics(
        &self,
        params: MetricsParams,
    ) -> InvestResult<LoadOutcome<Vec<EntityMetrics>>> {
        let snapshot = self.snapshot().await;
        let params = MetricsParams {
            codes: EntityCodes::from(&snapshot.selection),
            ..params
        };
        let data = self.source.metrics(&params).await.into_result()?;
        Ok(self
            .settle(&snapshot, metrics_from_payload(&data), |_| {})
            .await)
    }

    /// 선택된 엔티티의 VaR 요약.
    pub async fn load_var(&self, params: VarParams) -> InvestResult<LoadOutcome<Vec<VarSummary>>> {
        let snapshot = self.snapshot().await;
        let codes = EntityCodes::from(&snapshot.selection);
        let labels = codes.all_codes();
        let params = VarParams { codes, ..params };
        let data = self.source.value_at_risk(&params).await.into_result()?;
        Ok(self
            .settle(&snapshot, var_from_payload(&data, &labels), |_| {})
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use invest_core::{EntityKind, Selection};
    use invest_data::SyntheticSource;

    fn loader(selection: Selection) -> DashboardLoader {
        let source = SyntheticSource::new()
            .with_anchor(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
            .with_num_days(20);
        let state = SelectionState::default().with_selection(selection);
        DashboardLoader::new(Arc::new(source), Arc::new(RwLock::new(state)))
    }

    #[tokio::test]
    async fn test_chart_default_prices_by_entity() {
        let loader = loader(Selection::from_codes(Vec::<&str>::new(), ["AAPL", "MSFT"]));
        let view = loader.load_chart().await.applied().unwrap();

        assert_eq!(view.kind, ViewKind::Chart);
        assert_eq!(view.table.columns, vec!["AAPL", "MSFT"]);
        assert_eq!(view.table.len(), 20);
        assert!(!view.has_failures());
        assert_eq!(loader.latest().await, Some(view));
    }

    #[tokio::test]
    async fn test_chart_multiple_metrics_use_metric_columns() {
        let loader = loader(Selection::from_codes(Vec::<&str>::new(), ["AAPL"]));
        {
            let mut state = loader.state().write().await;
            state.set_enabled(Metric::Volatility, true);
            state.set_normalize(Metric::Price, NormalizeMode::Index);
        }
        let view = loader.load_chart().await.applied().unwrap();

        assert_eq!(view.table.columns, vec!["prices_AAPL", "volatility_AAPL"]);
        assert_eq!(view.table.rows[0].get("prices_AAPL"), Some(100.0));
    }

    #[tokio::test]
    async fn test_empty_selection_publishes_empty_view() {
        let loader = loader(Selection::new());
        let view = loader.load_chart().await.applied().unwrap();
        assert!(view.table.is_empty());
    }

    #[tokio::test]
    async fn test_comparison_and_scatter() {
        let loader = loader(Selection::from_codes(["PF001"], ["NVDA"]));

        let view = loader.load_comparison(Metric::Return).await.applied().unwrap();
        assert_eq!(view.kind, ViewKind::Comparison { metric: Metric::Return });
        assert_eq!(view.table.columns, vec!["PF001", "NVDA"]);

        let view = loader
            .load_scatter(Metric::Volatility, Metric::Return)
            .await
            .applied()
            .unwrap();
        let entities: Vec<_> = view.scatter.iter().map(|p| p.entity.as_str()).collect();
        assert_eq!(entities, vec!["PF001", "NVDA"]);
        assert!(view.scatter.iter().all(|p| p.x > 0.0));
    }

    #[tokio::test]
    async fn test_analytics_views() {
        let loader = loader(Selection::from_codes(Vec::<&str>::new(), ["AAPL", "MSFT"]));

        let matrix = loader
            .load_correlations(CorrelationParams::default())
            .await
            .unwrap()
            .applied()
            .flatten()
            .unwrap();
        assert_eq!(matrix.labels, vec!["AAPL", "MSFT"]);

        let metrics = loader
            .load_metrics(MetricsParams::default())
            .await
            .unwrap()
            .applied()
            .unwrap();
        assert_eq!(metrics.len(), 2);

        let var = loader
            .load_var(VarParams::default())
            .await
            .unwrap()
            .applied()
            .unwrap();
        assert_eq!(var.len(), 2);
        assert!(var[0].var_1d.is_some());
    }

    #[tokio::test]
    async fn test_selection_change_before_publish_is_stale() {
        let loader = loader(Selection::from_codes(Vec::<&str>::new(), ["AAPL"]));
        let snapshot = loader.snapshot().await;
        loader
            .state()
            .write()
            .await
            .add_entity(EntityKind::Security, "MSFT")
            .unwrap();

        let outcome = loader
            .publish(&snapshot, DashboardView::empty(ViewKind::Chart, snapshot.generation))
            .await;
        assert!(matches!(outcome, LoadOutcome::Stale { .. }));
        assert!(loader.latest().await.is_none());
    }
}

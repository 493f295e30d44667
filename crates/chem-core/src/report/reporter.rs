use std::cell::RefCell;
use std::rc::Rc;

use crate::errors::CurationError;
use crate::report::ReportEntry;

/// Estado de un reporter.
///
/// Transiciones válidas:
/// - `Uninitialized` -> `Collecting` (`initialize`)
/// - `Finalized` -> `Collecting` (`initialize`, nueva corrida)
/// - `Collecting` -> `Finalized` (`finalize`)
///
/// `clear` vuelve a `Uninitialized` desde cualquier estado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReporterState {
    Uninitialized,
    Collecting,
    Finalized,
}

/// Sumidero de incidencias compartido por todos los steps de una corrida.
pub trait Reporter {
    /// Abre una corrida. Falla si la anterior quedó sin finalizar.
    fn initialize(&mut self) -> Result<(), CurationError>;

    /// Sólo válido en `Collecting`.
    fn append(&mut self, entry: ReportEntry) -> Result<(), CurationError>;

    /// Cierra la corrida. Falla si no está en `Collecting` o si la corrida
    /// terminó con una excepción fatal (el estado se limpia igual).
    fn finalize(&mut self) -> Result<(), CurationError>;

    fn clear(&mut self);

    fn state(&self) -> ReporterState;

    fn ended_with_fatal(&self) -> bool;

    fn set_ended_with_fatal(&mut self, fatal: bool);

    /// Entradas acumuladas en la corrida actual.
    fn entries(&self) -> &[ReportEntry];
}

/// Handle único que se propaga por el árbol de steps. La ejecución es
/// secuencial, por eso basta `Rc<RefCell<_>>`.
pub type SharedReporter = Rc<RefCell<dyn Reporter>>;

pub fn shared<R: Reporter + 'static>(reporter: R) -> SharedReporter { Rc::new(RefCell::new(reporter)) }

/// Máquina de estados común a las implementaciones.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: ReporterState,
    fatal: bool,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self { state: ReporterState::Uninitialized,
               fatal: false }
    }
}

impl Lifecycle {
    pub fn state(&self) -> ReporterState { self.state }

    pub fn fatal(&self) -> bool { self.fatal }

    pub fn set_fatal(&mut self, fatal: bool) { self.fatal = fatal; }

    pub fn begin(&mut self) -> Result<(), CurationError> {
        if self.state == ReporterState::Collecting {
            return Err(CurationError::Reporter("previous report was not finalized".into()));
        }
        self.state = ReporterState::Collecting;
        self.fatal = false;
        Ok(())
    }

    pub fn ensure_collecting(&self) -> Result<(), CurationError> {
        match self.state {
            ReporterState::Collecting => Ok(()),
            ReporterState::Uninitialized => Err(CurationError::Reporter("reporter not initialized".into())),
            ReporterState::Finalized => Err(CurationError::Reporter("reporter already finalized".into())),
        }
    }

    /// Pasa a `Finalized`. Devuelve si la corrida terminó con fatal para que
    /// el llamador decida el error tras limpiar.
    pub fn end(&mut self) -> Result<bool, CurationError> {
        self.ensure_collecting()?;
        self.state = ReporterState::Finalized;
        Ok(self.fatal)
    }

    pub fn reset(&mut self) {
        self.state = ReporterState::Uninitialized;
        self.fatal = false;
    }
}
